//! Demonstration page showing how a form wires the file-history widget:
//! one upload input plus the operations table per declared field.

use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;

use crate::error::Result;
use crate::history::build_table;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DemoQuery {
    pub message: Option<String>,
}

pub async fn demo_page(
    State(state): State<AppState>,
    Query(query): Query<DemoQuery>,
) -> Result<Html<String>> {
    let mut body = String::from(
        "<!doctype html>\n<html>\n<head><title>File history demo</title></head>\n<body>\n<h1>File history demo</h1>\n",
    );

    if let Some(message) = query.message.as_deref() {
        body.push_str(&format!(
            "<p class=\"message\">{}</p>\n",
            escape(message)
        ));
    }

    for field in state.fields.all() {
        let table = build_table(&field, &state.file_manager, &state.selections, "/demo").await?;

        body.push_str(&format!("<h2>{}</h2>\n", escape(&field.label)));

        let accept = if field.extensions.is_empty() {
            String::new()
        } else {
            let list: Vec<String> = field.extensions.iter().map(|e| format!(".{}", e)).collect();
            format!(" accept=\"{}\"", list.join(","))
        };
        let multiple = if field.multiple { " multiple" } else { "" };

        body.push_str(&format!(
            "<form method=\"post\" enctype=\"multipart/form-data\" action=\"/api/fields/{}/upload?destination=/demo\">\n\
             <input type=\"file\" name=\"files\"{}{}>\n\
             <button type=\"submit\">Upload</button>\n</form>\n",
            escape(&field.name),
            accept,
            multiple,
        ));

        body.push_str("<table border=\"1\">\n<tr>");
        for cell in &table.header {
            body.push_str(&format!("<th>{}</th>", escape(cell)));
        }
        body.push_str("</tr>\n");

        for row in &table.rows {
            body.push_str("<tr>");
            body.push_str(&format!("<td>{}</td>", escape(&row.name)));
            body.push_str(&format!("<td>{}</td>", escape(&row.filename)));
            body.push_str(&format!("<td>{}</td>", escape(&row.uploaded_at)));
            body.push_str(&format!("<td>{}</td>", if row.active { "Yes" } else { "" }));

            body.push_str("<td>");
            for (i, op) in row.operations.iter().enumerate() {
                if i > 0 {
                    body.push_str(" | ");
                }
                body.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape(&op.url),
                    escape(&op.title)
                ));
            }
            body.push_str("</td></tr>\n");
        }

        body.push_str("</table>\n");
    }

    body.push_str("</body>\n</html>\n");

    Ok(Html(body))
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
