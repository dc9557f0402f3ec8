use serde::Deserialize;

use super::Params;

pub const MIX_SERVICE_NAME: &str = "混合";
pub const MIX_SERVICE_SITE: &str = "https://baidu.com";

/// One subscription provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Service {
    pub name: String,
    pub site: String,
    /// Tag used to group this service's nodes. Defaults to the first two
    /// characters of `name`.
    #[serde(default)]
    pub short_name: Option<String>,
    /// Whether the service also takes part in the aggregated mix service.
    #[serde(default)]
    pub mix: bool,
    #[serde(default, deserialize_with = "super::config::deserialize_params")]
    pub overrides: Params,
}

impl Service {
    pub fn short_name(&self) -> String {
        self.short_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .unwrap_or_else(|| self.name.chars().take(2).collect())
    }
}

/// Prefix the subscription URL with a tag and rename its nodes into a group
/// named after the service.
pub fn add_tag_metadata(service: &mut Service) {
    let short_name = service.short_name();
    let url = service.overrides.remove("url").unwrap_or_default();
    service
        .overrides
        .insert("url".into(), format!("tag:{},{}", short_name, url));
    service.overrides.insert(
        "rename".into(),
        format!("!!GROUP={0}!!^@[{0}]", short_name),
    );
}

/// Aggregate every service marked `mix` into a single service. Overrides are
/// merged with later services winning, then `url`, `exclude` and `rename` are
/// replaced by the joined values of all candidates.
pub fn build_mix_service(services: &[Service]) -> Option<Service> {
    let candidates: Vec<_> = services.iter().filter(|s| s.mix).collect();
    if candidates.is_empty() {
        return None;
    }

    let urls = join_override(&candidates, "url", "|");
    let excludes = join_override(&candidates, "exclude", "|");
    let renames = join_override(&candidates, "rename", "`");

    let mut overrides = Params::new();
    for candidate in &candidates {
        overrides.extend(candidate.overrides.clone());
    }
    overrides.insert("url".into(), urls);
    overrides.insert("exclude".into(), excludes);
    overrides.insert("rename".into(), renames);

    Some(Service {
        name: MIX_SERVICE_NAME.into(),
        site: MIX_SERVICE_SITE.into(),
        short_name: None,
        mix: false,
        overrides,
    })
}

fn join_override(services: &[&Service], key: &str, sep: &str) -> String {
    services
        .iter()
        .map(|s| s.overrides.get(key).map(String::as_str).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(sep)
}

pub fn prepare_services(raw_services: &[Service]) -> Vec<Service> {
    let mut services = raw_services.to_vec();
    for service in &mut services {
        add_tag_metadata(service);
    }
    if let Some(mix) = build_mix_service(&services) {
        services.push(mix);
    }
    services
}
