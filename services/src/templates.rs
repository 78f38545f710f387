//! HTML templates for embedded views.
//!
//! Rendered with maud, so every interpolated value is escaped. Pages pull
//! their styling from `/static/embed.css`.

use crate::embed::{GalleryEntry, GalleryView, TableView};
use maud::{DOCTYPE, Markup, html};
use serde_json::Value;

/// Templates able to render a [`TableView`], selected by the `view` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableTemplate {
    Table,
    List,
    Cards,
}

impl TableTemplate {
    pub fn for_view(view: &str) -> Option<Self> {
        match view {
            "table" => Some(Self::Table),
            "list" => Some(Self::List),
            "cards" => Some(Self::Cards),
            _ => None,
        }
    }

    pub fn render(self, view: &TableView) -> Markup {
        let body = match self {
            Self::Table => table_body(view),
            Self::List => list_body(view),
            Self::Cards => cards_body(view),
        };
        layout(&view.title, &body, view.preview.then(|| view.rows.len()))
    }
}

pub fn render_gallery(gallery: &GalleryView) -> Markup {
    let body = html! {
        section.embed-gallery {
            @for entry in &gallery.tables {
                (gallery_card(&gallery.org, &gallery.db, entry))
            }
        }
    };
    layout(&gallery.title, &body, None)
}

fn layout(title: &str, body: &Markup, preview_rows: Option<usize>) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="/static/embed.css";
            }
            body {
                main.embed {
                    h1.embed-title { (title) }
                    (body)
                    @if let Some(rows) = preview_rows {
                        footer.embed-preview { "Preview · " (rows) " rows" }
                    }
                }
            }
        }
    }
}

fn cell(value: &Value, is_image: bool) -> Markup {
    match value {
        Value::Null => html! {},
        Value::String(text) if is_image => html! {
            img.embed-image src=(text) loading="lazy" alt="";
        },
        Value::String(text) => html! { (text) },
        other => html! { (other.to_string()) },
    }
}

fn table_body(view: &TableView) -> Markup {
    let images: Vec<bool> = view
        .headers
        .iter()
        .map(|header| view.is_image_column(header))
        .collect();

    html! {
        table.embed-table {
            thead {
                tr {
                    @for header in &view.headers {
                        th { (header) }
                    }
                }
            }
            tbody {
                @for row in view.cell_rows() {
                    tr {
                        @for (value, is_image) in row.into_iter().zip(&images) {
                            td { (cell(value, *is_image)) }
                        }
                    }
                }
            }
        }
    }
}

fn list_body(view: &TableView) -> Markup {
    html! {
        ol.embed-list {
            @for row in view.cell_rows() {
                li {
                    dl {
                        @for (header, value) in view.headers.iter().zip(row) {
                            dt { (header) }
                            dd { (cell(value, view.is_image_column(header))) }
                        }
                    }
                }
            }
        }
    }
}

fn cards_body(view: &TableView) -> Markup {
    html! {
        section.embed-cards {
            @for row in view.cell_rows() {
                article.embed-card {
                    @for (header, value) in view.headers.iter().zip(&row) {
                        @if view.is_image_column(header) {
                            (cell(value, true))
                        }
                    }
                    dl {
                        @for (header, value) in view.headers.iter().zip(&row) {
                            @if !view.is_image_column(header) {
                                dt { (header) }
                                dd { (cell(value, false)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Link to a table embed. Each segment is percent-encoded.
fn table_href(org: &str, db: &str, table: &str) -> String {
    format!(
        "/embed/{}/{}/{}",
        urlencoding::encode(org),
        urlencoding::encode(db),
        urlencoding::encode(table)
    )
}

fn gallery_card(org: &str, db: &str, entry: &GalleryEntry) -> Markup {
    let href = table_href(org, db, &entry.table);
    html! {
        article.embed-card {
            h2 { a href=(href) { (entry.table) } }
            dl {
                dt { "Formats" }
                dd {
                    @match &entry.formats {
                        Some(formats) => (formats.join(", ")),
                        None => "n/a",
                    }
                }
                dt { "Size" }
                dd {
                    @match (entry.nrow, entry.ncol) {
                        (Some(nrow), Some(ncol)) => { (nrow) " rows × " (ncol) " columns" }
                        (Some(nrow), None) => { (nrow) " rows" }
                        _ => "n/a",
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::{Rows, TableView};
    use serde_json::json;

    fn view(view: &str, rows: Rows) -> TableView {
        TableView {
            title: "Acme Sales".to_owned(),
            headers: vec!["name".to_owned(), "photo".to_owned()],
            rows,
            image_columns: vec!["Photo".to_owned()],
            view: view.to_owned(),
            preview: false,
        }
    }

    fn record_rows() -> Rows {
        Rows::Records(vec![
            serde_json::from_value(json!({"name": "<b>X</b>", "photo": "https://img/1.png"}))
                .unwrap(),
        ])
    }

    #[test]
    fn known_views_have_templates() {
        assert_eq!(TableTemplate::for_view("table"), Some(TableTemplate::Table));
        assert_eq!(TableTemplate::for_view("list"), Some(TableTemplate::List));
        assert_eq!(TableTemplate::for_view("cards"), Some(TableTemplate::Cards));
        assert_eq!(TableTemplate::for_view("TABLE"), None);
        assert_eq!(TableTemplate::for_view("grid"), None);
    }

    #[test]
    fn table_escapes_values_and_renders_images() {
        let html = TableTemplate::Table
            .render(&view("table", record_rows()))
            .into_string();

        assert!(html.contains("<title>Acme Sales</title>"));
        assert!(html.contains("<th>name</th>"));
        assert!(html.contains("&lt;b&gt;X&lt;/b&gt;"));
        assert!(!html.contains("<b>X</b>"));
        assert!(html.contains("<img"));
        assert!(html.contains(r#"src="https://img/1.png""#));
    }

    #[test]
    fn list_renders_positional_rows() {
        let rows = Rows::Values(vec![vec![json!("Y"), json!(null)]]);
        let html = TableTemplate::List.render(&view("list", rows)).into_string();

        assert!(html.contains("<dt>name</dt><dd>Y</dd>"));
        assert!(html.contains("<dt>photo</dt><dd></dd>"));
    }

    #[test]
    fn preview_footer_counts_rows() {
        let mut table = view("table", record_rows());
        table.preview = true;
        let html = TableTemplate::Cards.render(&table).into_string();
        assert!(html.contains("Preview · 1 rows"));
    }

    #[test]
    fn gallery_lists_entries() {
        let gallery = GalleryView {
            title: "db".to_owned(),
            org: "acme".to_owned(),
            db: "db".to_owned(),
            tables: vec![
                GalleryEntry {
                    table: "t1".to_owned(),
                    formats: Some(vec!["csv".to_owned(), "json".to_owned()]),
                    nrow: Some(10),
                    ncol: Some(3),
                },
                GalleryEntry {
                    table: "t2".to_owned(),
                    formats: None,
                    nrow: None,
                    ncol: None,
                },
            ],
        };

        let html = render_gallery(&gallery).into_string();
        assert!(html.contains(r#"<a href="/embed/acme/db/t1">t1</a>"#));
        assert!(html.contains("csv, json"));
        assert!(html.contains("10 rows × 3 columns"));
        assert!(html.contains(">t2</a>"));
    }

    #[test]
    fn table_links_encode_each_segment() {
        assert_eq!(table_href("acme", "db", "t1"), "/embed/acme/db/t1");
        assert_eq!(
            table_href("ac me", "a/b", "q?x#y"),
            "/embed/ac%20me/a%2Fb/q%3Fx%23y"
        );

        let gallery = GalleryView {
            title: "db".to_owned(),
            org: "acme".to_owned(),
            db: "db".to_owned(),
            tables: vec![GalleryEntry {
                table: "q?x#y".to_owned(),
                formats: None,
                nrow: None,
                ncol: None,
            }],
        };
        let html = render_gallery(&gallery).into_string();
        assert!(html.contains(r#"<a href="/embed/acme/db/q%3Fx%23y">q?x#y</a>"#));
    }
}
