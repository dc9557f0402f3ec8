use super::profile::ProfileEntry;

const HEADER: &str = "| 机场  | 类型 | 链接  | 短连接|\n| :----: | :----: | :----: | :----: |";

/// Render one Markdown row per entry, paired with its short URL.
pub fn render_table<'a>(rows: impl IntoIterator<Item = (&'a ProfileEntry, &'a str)>) -> String {
    let mut lines = vec![HEADER.to_string()];
    lines.extend(rows.into_iter().map(|(entry, short_url)| {
        format!(
            "|[{}]({})|{}|[链接]({})|{}|",
            entry.service, entry.site, entry.kind, entry.url, short_url
        )
    }));
    lines.join("\n")
}
