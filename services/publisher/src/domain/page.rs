/// Listing page rendering
///
/// One page template and one item-card template, both immutable. The page kind
/// selects the heading and the theme; everything else is shared between the
/// home page and the section pages.
use thiserror::Error;

use crate::domain::{AssetRecord, PublishDate};

/// Generic viewer page for sections that can be embedded
pub const LOADER_PAGE: &str = "load.html";

/// Site name shown in the page title and heading
pub const SITE_NAME: &str = "AutoContentHub";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{site}} {{subpage}}</title>
    <style>
        body {
            font-family: 'Roboto', sans-serif;
            margin: 0;
            padding: 0;
            background-color: #f5f5f5;
            color: #333;
            line-height: 1.6;
        }

        .container {
            width: 90%;
            max-width: 1000px;
            margin: 50px auto;
            background: linear-gradient(135deg, #ffffff, #f0f0f0);
            padding: 40px;
            border-radius: 12px;
            box-shadow: 0 8px 30px rgba(0, 0, 0, 0.1);
        }

        h1 {
            text-align: center;
            font-size: 3em;
            font-weight: 700;
            margin-bottom: 50px;
        }

        h1 a {
            text-decoration: none;
            color: {{accent}};
        }

        h1 a:hover {
            color: {{accent_dark}};
        }

        .assets {
            display: grid;
            grid-template-columns: repeat({{columns}}, minmax(0, 1fr));
            gap: 0 30px;
        }

        .article {
            border-bottom: 2px solid rgba(0, 0, 0, 0.1);
            padding: 25px 0;
        }

        .article:hover {
            background-color: #f9f9f9;
            border-radius: 8px;
        }

        .theme {
            font-size: 1.2em;
            font-weight: 500;
            color: {{accent}};
            background-color: {{accent_soft}};
            padding: 4px 8px;
            border-radius: 4px;
            margin-right: 15px;
            text-decoration: none;
        }

        .theme:hover {
            background-color: {{accent}};
            color: #ffffff;
        }

        .title {
            font-size: 1.6em;
            font-weight: 700;
            color: #333;
            text-decoration: none;
            margin-left: 10px;
        }

        .title:hover {
            color: {{accent}};
            text-decoration: underline;
        }

        .description {
            font-size: 1.1em;
            margin: 15px 0 0 0;
            color: #666;
            line-height: 1.8;
        }

        @media (max-width: 600px) {
            h1 {
                font-size: 2.2em;
            }
            .container {
                padding: 25px;
            }
            .assets {
                grid-template-columns: minmax(0, 1fr);
            }
        }
    </style>
</head>
<body>
    <div class="container">
        <h1><a href="/"><span class="title_main">{{site}}</span></a><span class="title_sub"> {{subpage}}</span></h1>
        <div class="assets">{{assets}}
        </div>
    </div>
</body>
</html>
"#;

const ASSET_TEMPLATE: &str = r#"
            <div class="article">
                <div>
                <a href="/{{section}}"><span class="theme">#{{section}}</span></a>
                <a href="/{{link}}"><span class="title">{{title}}</span></a>
                </div>
                <p class="description">{{description}}</p>
            </div>"#;

/// Error returned when a stored row cannot be rendered
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Asset {section}/{date} is missing field: {field}")]
    MissingField {
        field: &'static str,
        section: String,
        date: String,
    },
}

/// Colours and layout of a listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTheme {
    pub accent: &'static str,
    pub accent_dark: &'static str,
    pub accent_soft: &'static str,
    pub columns: u8,
}

/// Which listing is being rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    /// Home page of one publish date
    Home(PublishDate),
    /// Index of one section
    Section(String),
}

impl PageKind {
    /// Subtitle shown next to the site name
    pub fn heading(&self) -> String {
        match self {
            PageKind::Home(date) => format!("[{}]", date.display()),
            PageKind::Section(section) => format!("[#{}]", section),
        }
    }

    pub fn theme(&self) -> PageTheme {
        match self {
            PageKind::Home(_) => PageTheme {
                accent: "#007BFF",
                accent_dark: "#0056b3",
                accent_soft: "rgba(0, 123, 255, 0.1)",
                columns: 1,
            },
            PageKind::Section(_) => PageTheme {
                accent: "#17a2b8",
                accent_dark: "#117a8b",
                accent_soft: "rgba(23, 162, 184, 0.1)",
                columns: 2,
            },
        }
    }
}

/// Substitute `{{name}}` placeholders
///
/// Values are inserted verbatim and never re-scanned. Unknown placeholders are kept as is.
pub fn fill_template(template: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after_open[..end];
        match fields.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Relative link of an asset from the site root
///
/// Games are standalone interactive documents and are linked directly;
/// everything else goes through the loader page.
pub fn asset_link(record: &AssetRecord) -> String {
    let date = record.date.key();
    if record.is_game() {
        format!("{}/{}.html", record.section, date)
    } else {
        format!("{}?section={}&date={}", LOADER_PAGE, record.section, date)
    }
}

fn render_card(record: &AssetRecord) -> Result<String, RenderError> {
    let missing = |field| RenderError::MissingField {
        field,
        section: record.section.clone(),
        date: record.date.key(),
    };
    let title = record.title.as_deref().ok_or_else(|| missing("title"))?;
    let description = record
        .description
        .as_deref()
        .ok_or_else(|| missing("description"))?;
    let link = asset_link(record);

    Ok(fill_template(
        ASSET_TEMPLATE,
        &[
            ("section", record.section.as_str()),
            ("link", link.as_str()),
            ("title", title),
            ("description", description),
        ],
    ))
}

/// Render a listing page from assets, in the given order
pub fn render_page(kind: &PageKind, assets: &[AssetRecord]) -> Result<String, RenderError> {
    let cards = assets
        .iter()
        .map(render_card)
        .collect::<Result<Vec<_>, _>>()?
        .concat();

    let theme = kind.theme();
    let heading = kind.heading();
    let columns = theme.columns.to_string();

    Ok(fill_template(
        PAGE_TEMPLATE,
        &[
            ("site", SITE_NAME),
            ("subpage", heading.as_str()),
            ("accent", theme.accent),
            ("accent_dark", theme.accent_dark),
            ("accent_soft", theme.accent_soft),
            ("columns", columns.as_str()),
            ("assets", cards.as_str()),
        ],
    ))
}
