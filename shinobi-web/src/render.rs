//! HTML rendering for the character pages
//!
//! Plain `format!` templates with an embedded stylesheet. Every value that
//! comes from an upstream API goes through `html_escape` before it is
//! written into markup.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use reqwest::Url;
use serde_json::Value;
use shinobi_common::NormalizedCharacter;

use crate::api::buildinfo::BuildInfo;
use crate::fetcher::PageEnvelope;
use crate::pagination::{page_range, total_pages, PageItem, MAX_PAGE_BUTTONS};

const STYLE: &str = r#"
        * { box-sizing: border-box; }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: #fff7ed;
            color: #1e293b;
            margin: 0;
        }
        header { background: #f97316; color: white; padding: 16px 24px; }
        header a { color: white; text-decoration: none; font-weight: 700; font-size: 22px; }
        main { max-width: 1200px; margin: 0 auto; padding: 24px; }
        footer { text-align: center; color: #94a3b8; font-size: 12px; padding: 24px; }
        .button {
            display: inline-block; padding: 10px 20px; background: #4f46e5; color: white;
            text-decoration: none; border-radius: 8px;
        }
        .summary { color: #475569; font-size: 14px; }
        .warning {
            background: #fef9c3; border: 1px solid #fde047; color: #854d0e;
            padding: 12px; border-radius: 6px; margin-bottom: 16px;
        }
        .grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 16px; }
        .card-link {
            display: flex; flex-direction: column; align-items: center; text-align: center;
            height: 100%; background: white; border-radius: 10px; padding: 16px;
            box-shadow: 0 1px 3px rgba(0,0,0,0.12); color: inherit; text-decoration: none;
            transition: transform 0.2s;
        }
        .card-link:hover { transform: translateY(-4px); }
        .avatar {
            width: 112px; height: 112px; border-radius: 50%; overflow: hidden; background: #f1f5f9;
            display: flex; align-items: center; justify-content: center; margin-bottom: 12px;
        }
        .avatar img { width: 100%; height: 100%; object-fit: cover; }
        .facts { color: #64748b; font-size: 14px; }
        .badge { display: inline-block; font-size: 12px; font-weight: 600; padding: 2px 8px; border-radius: 999px; margin-bottom: 8px; }
        .badge-emerald { background: #d1fae5; color: #065f46; }
        .badge-amber { background: #fef3c7; color: #92400e; }
        .badge-sky { background: #e0f2fe; color: #075985; }
        .badge-slate { background: #f1f5f9; color: #1e293b; }
        .badge-purple { background: #f3e8ff; color: #6b21a8; }
        .badge-indigo { background: #e0e7ff; color: #3730a3; }
        .pages { margin-top: 16px; display: flex; flex-wrap: wrap; gap: 8px; align-items: center; }
        .pages a, .pages span.current {
            padding: 4px 12px; border: 1px solid #cbd5e1; border-radius: 8px; background: white;
            color: #334155; text-decoration: none; font-size: 14px;
        }
        .pages span.current { background: #4f46e5; color: white; border-color: #4f46e5; }
        .pages .gap { color: #94a3b8; }
        .detail { background: white; border-radius: 14px; box-shadow: 0 4px 12px rgba(0,0,0,0.12); display: flex; flex-wrap: wrap; overflow: hidden; }
        .detail-image { flex: 1 1 320px; background: linear-gradient(135deg, #fef3c7, #ffe4e6); display: flex; align-items: center; justify-content: center; padding: 24px; }
        .detail-image img, .detail-image .placeholder { width: 192px; height: 192px; border-radius: 50%; object-fit: cover; }
        .detail-image .placeholder { background: #e2e8f0; display: flex; align-items: center; justify-content: center; font-size: 48px; }
        .detail-body { flex: 1 1 320px; padding: 24px; }
        .tiles { display: grid; grid-template-columns: 1fr 1fr; gap: 12px; }
        .tile { background: #f8fafc; border-radius: 8px; padding: 12px; }
        .tile strong { display: block; font-size: 13px; color: #475569; }
        .tile.wide { grid-column: span 2; }
"#;

const PIN_ICON: &str = r#"<svg width="12" height="12" viewBox="0 0 24 24" fill="none" aria-hidden="true"><path d="M12 2C8.686 2 6 4.686 6 8c0 4.418 6 12 6 12s6-7.582 6-12c0-3.314-2.686-6-6-6z" stroke="currentColor" stroke-width="1.2"/><circle cx="12" cy="8" r="2.1" fill="currentColor"/></svg>"#;

const PERSON_ICON: &str = r##"<svg width="56" height="56" viewBox="0 0 24 24" fill="none" aria-hidden="true"><circle cx="12" cy="8" r="3" stroke="#94a3b8" stroke-width="1.5"/><path d="M4 20c0-3.5 3.5-6 8-6s8 2.5 8 6" stroke="#94a3b8" stroke-width="1.5" stroke-linecap="round"/></svg>"##;

/// Badge color theme derived from a village name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VillageTheme {
    Leaf,
    Sand,
    Mist,
    Cloud,
    Sound,
    Other,
}

impl VillageTheme {
    /// Keyword heuristic over the lowercased village name
    pub fn from_village(village: &str) -> Self {
        let key = village.to_lowercase();
        if key.contains("leaf") || key.contains("konoha") {
            VillageTheme::Leaf
        } else if key.contains("sand") {
            VillageTheme::Sand
        } else if key.contains("mist") {
            VillageTheme::Mist
        } else if key.contains("cloud") || key.contains("kumogakure") {
            VillageTheme::Cloud
        } else if key.contains("sound") {
            VillageTheme::Sound
        } else {
            VillageTheme::Other
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            VillageTheme::Leaf => "badge-emerald",
            VillageTheme::Sand => "badge-amber",
            VillageTheme::Mist => "badge-sky",
            VillageTheme::Cloud => "badge-slate",
            VillageTheme::Sound => "badge-purple",
            VillageTheme::Other => "badge-indigo",
        }
    }
}

/// Display text for an arbitrary raw value
///
/// Scalars as-is, arrays joined with `", "`, objects as their truthy values
/// joined with `", "`, anything else as compact JSON.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| value_text(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(map) => {
            let parts: Vec<String> = map
                .values()
                .filter(|v| is_truthy(v))
                .filter_map(value_text)
                .collect();
            if parts.is_empty() {
                serde_json::to_string(value).ok()
            } else {
                Some(parts.join(", "))
            }
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `/characters/{id or name slug}`, percent-encoded
pub fn detail_href(character: &NormalizedCharacter) -> String {
    let key = character.detail_key();
    match Url::parse("http://localhost/characters/") {
        Ok(mut url) => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(&key);
            }
            url.path().to_string()
        }
        Err(_) => "/characters".to_string(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Village badge with theme color and accessible label
pub fn village_badge(village: &str) -> String {
    format!(
        r#"<span class="badge {class}" aria-label="Village: {label}">{icon} {name}</span>"#,
        class = VillageTheme::from_village(village).css_class(),
        label = attr(village),
        icon = PIN_ICON,
        name = text(village),
    )
}

/// Grid card linking to the detail page
pub fn character_card(character: &NormalizedCharacter) -> String {
    let avatar = match non_empty(&character.image) {
        Some(src) => format!(r#"<img src="{}" alt="{}">"#, attr(src), attr(&character.name)),
        None => PERSON_ICON.to_string(),
    };

    let badge = non_empty(&character.village)
        .map(village_badge)
        .unwrap_or_default();

    let mut facts = String::new();
    if let Some(clan) = non_empty(&character.clan) {
        facts.push_str(&format!("<div>{}</div>", text(clan)));
    }
    for (label, value) in [
        ("Occupation", non_empty(&character.occupation)),
        ("Rank", non_empty(&character.rank)),
        ("Chakra", non_empty(&character.chakra_nature)),
    ] {
        if let Some(value) = value {
            facts.push_str(&format!("<div>{}: {}</div>", label, text(value)));
        }
    }
    if let Some(count) = character.jutsu_count {
        facts.push_str(&format!("<div>Jutsu: {}</div>", count));
    }

    format!(
        r#"<div class="card"><a class="card-link" href="{href}"><div class="avatar">{avatar}</div>{badge}<h3>{name}</h3><div class="facts">{facts}</div></a></div>"#,
        href = attr(&detail_href(character)),
        avatar = avatar,
        badge = badge,
        name = text(&character.name),
        facts = facts,
    )
}

/// Prev/next links and the numbered page strip
pub fn pagination_nav(current: usize, total_pages: usize) -> String {
    let mut nav = String::from(r#"<nav class="pages" aria-label="Pages"><span>Pages:</span>"#);

    if current > 1 {
        nav.push_str(&format!(
            r#"<a href="/characters?page={}" rel="prev">Prev</a>"#,
            current - 1
        ));
    }
    for item in page_range(current, total_pages, MAX_PAGE_BUTTONS) {
        match item {
            PageItem::Page(page) if page == current => nav.push_str(&format!(
                r#"<span class="current" aria-current="page">{}</span>"#,
                page
            )),
            PageItem::Page(page) => {
                nav.push_str(&format!(r#"<a href="/characters?page={0}">{0}</a>"#, page))
            }
            PageItem::Gap => nav.push_str(r#"<span class="gap">…</span>"#),
        }
    }
    if current < total_pages {
        nav.push_str(&format!(
            r#"<a href="/characters?page={}" rel="next">Next</a>"#,
            current + 1
        ));
    }

    nav.push_str("</nav>");
    nav
}

/// Full HTML document around `body`
pub fn layout(title: &str, body: &str) -> String {
    let build = BuildInfo::current();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
    <header><a href="/">Shinobi Roster</a></header>
    <main>
{body}
    </main>
    <footer>shinobi-web v{version} ({git_hash})</footer>
</body>
</html>
"#,
        title = text(title),
        style = STYLE,
        body = body,
        version = build.version,
        git_hash = text(&build.git_hash),
    )
}

/// GET / page
pub fn home_page() -> String {
    layout(
        "Shinobi Roster",
        r#"<div style="text-align:center;padding:48px 0">
    <h1>Welcome to Shinobi Roster</h1>
    <p>Meet the ninja of the Hidden Villages: their clans, ranks, chakra and jutsu.</p>
    <a class="button" href="/characters">View Characters</a>
</div>"#,
    )
}

/// Character grid page for one envelope
pub fn characters_page(envelope: &PageEnvelope) -> String {
    let pages = total_pages(envelope.total, envelope.per_page).max(1);
    let mut body = format!(
        r#"<h2>Characters</h2><p class="summary">Showing page {} of {} — {} total characters</p>"#,
        envelope.page, pages, envelope.total
    );

    if let Some(error) = &envelope.error {
        let source = envelope
            .source
            .as_deref()
            .map(|s| format!(" (source: {})", text(s)))
            .unwrap_or_default();
        body.push_str(&format!(
            r#"<div class="warning"><strong>Warning:</strong> {}{}</div>"#,
            text(error),
            source
        ));
    }

    if envelope.data.is_empty() {
        body.push_str(r#"<p class="summary">No characters found on this page.</p>"#);
        if let Some(source) = &envelope.source {
            body.push_str(&format!(
                r#"<p class="summary">Data source: {}</p>"#,
                text(source)
            ));
        }
    } else {
        body.push_str(r#"<div class="grid">"#);
        for character in &envelope.data {
            body.push_str(&character_card(character));
        }
        body.push_str("</div>");
    }

    if envelope.total > envelope.per_page {
        body.push_str(&pagination_nav(envelope.page, pages));
    }

    layout("Characters - Shinobi Roster", &body)
}

/// Detail page for one character
pub fn character_detail_page(character: &NormalizedCharacter) -> String {
    let image = match non_empty(&character.image) {
        Some(src) => format!(r#"<img src="{}" alt="{}">"#, attr(src), attr(&character.name)),
        None => r#"<div class="placeholder">?</div>"#.to_string(),
    };

    let mut chips = String::new();
    if let Some(village) = non_empty(&character.village) {
        chips.push_str(&village_badge(village));
    }
    if let Some(clan) = non_empty(&character.clan) {
        chips.push_str(&format!(r#" <span class="badge badge-slate">{}</span>"#, text(clan)));
    }
    if let Some(age) = character.extra(&["age", "birthday"]).and_then(value_text) {
        chips.push_str(&format!(r#" <span class="badge badge-amber">Age: {}</span>"#, text(&age)));
    }
    if let Some(rank) = non_empty(&character.rank) {
        chips.push_str(&format!(r#" <span class="badge badge-amber">{}</span>"#, text(rank)));
    }

    let description = character
        .extra(&["description", "about", "bio"])
        .and_then(value_text)
        .unwrap_or_else(|| "No description available.".to_string());
    let parents = character
        .extra(&["parents", "parent", "parentsName"])
        .and_then(value_text);
    let jutsu = character.jutsu_count.map(|count| count.to_string());

    let tile = |label: &str, value: Option<&str>| {
        format!(
            r#"<div class="tile"><strong>{}</strong>{}</div>"#,
            label,
            text(value.unwrap_or("Unknown"))
        )
    };

    let mut tiles = String::new();
    tiles.push_str(&tile("Parents", parents.as_deref()));
    tiles.push_str(&tile("Chakra", character.chakra_nature.as_deref()));
    tiles.push_str(&tile("Clan", character.clan.as_deref()));
    tiles.push_str(&tile("Jutsu Count", jutsu.as_deref()));
    tiles.push_str(&tile("Occupation", character.occupation.as_deref()));
    if let Some(plan) = character.extra(&["plan"]).and_then(value_text) {
        tiles.push_str(&format!(
            r#"<div class="tile wide"><strong>Plan</strong>{}</div>"#,
            text(&plan)
        ));
    }

    let body = format!(
        r#"<div class="detail">
    <div class="detail-image">{image}</div>
    <div class="detail-body">
        <h1>{name}</h1>
        <div>{chips}</div>
        <p>{description}</p>
        <div class="tiles">{tiles}</div>
        <p><a class="button" href="/characters">Back</a></p>
    </div>
</div>"#,
        image = image,
        name = text(&character.name),
        chips = chips,
        description = text(&description),
        tiles = tiles,
    );

    layout(&format!("{} - Shinobi Roster", character.name), &body)
}

/// Shown when a lookup finds nothing
pub fn not_found_page() -> String {
    layout(
        "Character not found - Shinobi Roster",
        r#"<h1>Character not found</h1>
<p>We couldn't find that character. Try the <a href="/characters">characters list</a>.</p>"#,
    )
}

/// Shown when no upstream could be reached
pub fn unavailable_page() -> String {
    layout(
        "Service unavailable - Shinobi Roster",
        r#"<h1>Service unavailable</h1>
<p>The character archives can't be reached right now. Please try again in a little while, or go back to the <a href="/characters">characters list</a>.</p>"#,
    )
}
