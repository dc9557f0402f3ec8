use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use thiserror::Error;
use url::Url;

use super::config::AppConfig;
use super::service::prepare_services;
use super::Params;

pub const HOME_OFFICE_TAG: &str = "HO";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error(r#"configuration file for "{0}" is missing"#)]
    MissingConfigFile(&'static str),
    #[error("invalid converter endpoint")]
    InvalidEndpoint,
}

pub type ProfileResult<T> = Result<T, ProfileError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProfileKind {
    Work,
    General,
    Router,
}

/// How a profile kind shapes the converter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileRule {
    /// Key into `Settings::config_files`.
    pub config_key: &'static str,
    /// Append the shared home office rule list to the subscription URL.
    pub append_extend: bool,
    pub rename_suffix: Option<&'static str>,
    pub target: &'static str,
}

const WORK_RULE: ProfileRule = ProfileRule {
    config_key: "work",
    append_extend: true,
    rename_suffix: Some("`!!GROUP=HO!!^@[HO]"),
    target: "clashr",
};
const GENERAL_RULE: ProfileRule = ProfileRule {
    config_key: "general",
    append_extend: true,
    rename_suffix: Some("`!!GROUP=HO!!^@[HO]"),
    target: "clashr",
};
const ROUTER_RULE: ProfileRule = ProfileRule {
    config_key: "router",
    append_extend: false,
    rename_suffix: None,
    target: "clashr",
};

impl ProfileKind {
    pub const ALL: [ProfileKind; 3] = [ProfileKind::Work, ProfileKind::General, ProfileKind::Router];

    pub fn rule(self) -> &'static ProfileRule {
        match self {
            ProfileKind::Work => &WORK_RULE,
            ProfileKind::General => &GENERAL_RULE,
            ProfileKind::Router => &ROUTER_RULE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileKind::Work => "WORK",
            ProfileKind::General => "GENERAL",
            ProfileKind::Router => "ROUTER",
        }
    }
}

impl Display for ProfileKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service parameters: global defaults overlaid by the service's overrides.
pub fn merge_params(defaults: &Params, overrides: &Params) -> Params {
    let mut merged = defaults.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

pub fn build_profile_params(
    service_name: &str,
    base: &Params,
    kind: ProfileKind,
    extend_url: &str,
    config_files: &BTreeMap<String, String>,
) -> ProfileResult<Params> {
    let rule = kind.rule();
    let mut params = base.clone();
    params.insert("target".into(), rule.target.into());

    if rule.append_extend {
        let url = params.remove("url").unwrap_or_default();
        params.insert(
            "url".into(),
            format!("{}|tag:{},{}", url, HOME_OFFICE_TAG, extend_url),
        );
    }
    if let Some(suffix) = rule.rename_suffix {
        let rename = params.remove("rename").unwrap_or_default();
        params.insert("rename".into(), format!("{}{}", rename, suffix));
    }

    let config = config_files
        .get(rule.config_key)
        .ok_or(ProfileError::MissingConfigFile(rule.config_key))?;
    params.insert("config".into(), config.clone());
    params.insert("filename".into(), format!("{}_{}.yaml", service_name, kind));
    Ok(params)
}

pub fn profile_url(endpoint: &str, params: &Params) -> ProfileResult<Url> {
    let mut url = Url::parse(endpoint).map_err(|_| ProfileError::InvalidEndpoint)?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

/// A converter URL waiting to be shortened and rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    pub service: String,
    pub site: String,
    pub kind: ProfileKind,
    pub url: Url,
}

/// Every prepared service crossed with every profile kind, in table order.
pub fn plan_profiles(config: &AppConfig) -> ProfileResult<Vec<ProfileEntry>> {
    let settings = &config.subconverter;
    let services = prepare_services(&config.services);
    let mut entries = Vec::with_capacity(services.len() * ProfileKind::ALL.len());
    for service in &services {
        let base = merge_params(&settings.defaults, &service.overrides);
        for kind in ProfileKind::ALL {
            let params = build_profile_params(
                &service.name,
                &base,
                kind,
                &settings.extend_url,
                &settings.config_files,
            )?;
            entries.push(ProfileEntry {
                service: service.name.clone(),
                site: service.site.clone(),
                kind,
                url: profile_url(&settings.endpoint, &params)?,
            });
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subconverter::config::Settings;
    use crate::subconverter::service::Service;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn config_files() -> BTreeMap<String, String> {
        params(&[("work", "w.ini"), ("general", "g.ini"), ("router", "r.ini")])
    }

    #[test]
    fn test_profile_kind_display() {
        let names: Vec<_> = ProfileKind::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["WORK", "GENERAL", "ROUTER"]);
    }

    #[test]
    fn test_merge_params() {
        let merged = merge_params(
            &params(&[("emoji", "true"), ("list", "false")]),
            &params(&[("emoji", "false"), ("url", "u")]),
        );
        assert_eq!(
            merged,
            params(&[("emoji", "false"), ("list", "false"), ("url", "u")])
        );
    }

    #[test]
    fn test_build_profile_params_work() {
        let base = params(&[("url", "tag:AL,u"), ("rename", "!!GROUP=AL!!^@[AL]")]);
        let res =
            build_profile_params("Alpha", &base, ProfileKind::Work, "ho.list", &config_files())
                .unwrap();
        assert_eq!(
            res,
            params(&[
                ("url", "tag:AL,u|tag:HO,ho.list"),
                ("rename", "!!GROUP=AL!!^@[AL]`!!GROUP=HO!!^@[HO]"),
                ("target", "clashr"),
                ("config", "w.ini"),
                ("filename", "Alpha_WORK.yaml"),
            ])
        );
    }

    #[test]
    fn test_build_profile_params_router() {
        let base = params(&[("url", "tag:AL,u"), ("rename", "!!GROUP=AL!!^@[AL]")]);
        let res = build_profile_params(
            "Alpha",
            &base,
            ProfileKind::Router,
            "ho.list",
            &config_files(),
        )
        .unwrap();
        assert_eq!(res["url"], "tag:AL,u");
        assert_eq!(res["rename"], "!!GROUP=AL!!^@[AL]");
        assert_eq!(res["config"], "r.ini");
        assert_eq!(res["filename"], "Alpha_ROUTER.yaml");
    }

    #[test]
    fn test_build_profile_params_missing_config_file() {
        let res = build_profile_params(
            "Alpha",
            &Params::new(),
            ProfileKind::General,
            "ho.list",
            &params(&[("work", "w.ini")]),
        );
        assert_eq!(res, Err(ProfileError::MissingConfigFile("general")));
    }

    #[test]
    fn test_profile_url() {
        let url = profile_url(
            "https://sub.example.com/sub",
            &params(&[("target", "clashr"), ("url", "tag:A,https://a/b?c=d|e")]),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sub.example.com/sub?target=clashr&url=tag%3AA%2Chttps%3A%2F%2Fa%2Fb%3Fc%3Dd%7Ce"
        );
    }

    #[test]
    fn test_profile_url_no_params() {
        let url = profile_url("https://sub.example.com/sub", &Params::new()).unwrap();
        assert_eq!(url.as_str(), "https://sub.example.com/sub");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_profile_url_invalid_endpoint() {
        assert_eq!(
            profile_url("not a url", &Params::new()),
            Err(ProfileError::InvalidEndpoint)
        );
    }

    #[test]
    fn test_plan_profiles() {
        let config = AppConfig {
            subconverter: Settings {
                endpoint: "https://sub.example.com/sub".into(),
                extend_url: "ho.list".into(),
                shortener: "https://s.example.com".into(),
                config_files: config_files(),
                defaults: params(&[("emoji", "true")]),
            },
            services: vec![Service {
                name: "Alpha".into(),
                site: "https://alpha.example.com".into(),
                short_name: Some("AL".into()),
                mix: true,
                overrides: params(&[("url", "u")]),
            }],
        };
        let entries = plan_profiles(&config).unwrap();
        // One service plus the mix service, three kinds each.
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0].service, "Alpha");
        assert_eq!(entries[0].kind, ProfileKind::Work);
        assert_eq!(entries[2].kind, ProfileKind::Router);
        assert_eq!(entries[3].service, "混合");
        let query: Params = entries[1].url.query_pairs().into_owned().collect();
        assert_eq!(query["emoji"], "true");
        assert_eq!(query["url"], "tag:AL,u|tag:HO,ho.list");
        assert_eq!(query["filename"], "Alpha_GENERAL.yaml");
    }
}
