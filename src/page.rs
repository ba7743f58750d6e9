// 🖥️ Index page - server-side render of the ledger into the embedded template

use crate::aggregate::Balances;
use crate::movement::Movement;
use std::fmt::Write;

const INDEX_TEMPLATE: &str = include_str!("../web/index.html");

/// Render the index page for already ordered movements
pub fn render_index(movimientos: &[Movement], saldos: &Balances) -> String {
    INDEX_TEMPLATE
        .replace("{{SALDO_BANCO}}", &format_amount(saldos.banco))
        .replace("{{SALDO_CASH}}", &format_amount(saldos.cash))
        .replace("{{SALDO_TOTAL}}", &format_amount(saldos.total))
        .replace("{{FILAS}}", &render_rows(movimientos))
}

fn render_rows(movimientos: &[Movement]) -> String {
    if movimientos.is_empty() {
        return r#"<tr class="vacio"><td colspan="5">No hay movimientos</td></tr>"#.to_string();
    }

    let mut rows = String::new();
    for m in movimientos {
        let sign = if m.cantidad < 0.0 { "negativo" } else { "positivo" };
        // writing into a String cannot fail
        let _ = write!(
            rows,
            "<tr data-id=\"{id}\"><td>{fecha}</td><td>{asunto}</td><td>{tipo}</td>\
             <td class=\"num {sign}\">{cantidad}</td>\
             <td><button type=\"button\" class=\"eliminar\" data-id=\"{id}\">Eliminar</button></td></tr>\n",
            id = escape_html(&m.id),
            fecha = escape_html(m.fecha.as_deref().unwrap_or("")),
            asunto = escape_html(&m.asunto),
            tipo = escape_html(&m.tipo),
            sign = sign,
            cantidad = format_amount(m.cantidad),
        );
    }
    rows
}

/// Two decimals, as shown everywhere on the page
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Minimal escaping for text and double-quoted attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::compute;

    fn mov(id: &str, fecha: &str, asunto: &str, tipo: &str, cantidad: f64) -> Movement {
        Movement {
            id: id.to_string(),
            fecha: Some(fecha.to_string()),
            asunto: asunto.to_string(),
            tipo: tipo.to_string(),
            cantidad,
        }
    }

    #[test]
    fn test_render_shows_balances_and_rows_in_order() {
        let (ordered, saldos) = compute(vec![
            mov("g", "2024-01-05", "Groceries", "CASH", -50.0),
            mov("s", "2024-01-10", "Salary", "BANCO", 1000.0),
        ]);

        let html = render_index(&ordered, &saldos);

        assert!(html.contains("1000.00"));
        assert!(html.contains("-50.00"));
        assert!(html.contains("950.00"));
        let salary = html.find("Salary").unwrap();
        let groceries = html.find("Groceries").unwrap();
        assert!(salary < groceries, "newest movement must come first");
        assert!(!html.contains("{{"), "all placeholders replaced");
    }

    #[test]
    fn test_render_escapes_user_text() {
        let rows = vec![mov("x", "2024-01-01", "<script>alert(1)</script>", "CASH", 1.0)];

        let html = render_index(&rows, &Balances::default());

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_quote_in_id_cannot_leave_the_attribute() {
        let rows = vec![mov("x\" onmouseover=\"alert(1)", "2024-01-01", "a", "CASH", 1.0)];

        let html = render_index(&rows, &Balances::default());

        assert!(!html.contains("onmouseover=\"alert(1)"));
        assert!(html.contains("data-id=\"x&quot; onmouseover=&quot;alert(1)\""));
    }

    #[test]
    fn test_page_script_builds_rows_without_markup_strings() {
        // redraws go through textContent / dataset, never through HTML text
        assert!(!INDEX_TEMPLATE.contains("innerHTML"));
        assert!(INDEX_TEMPLATE.contains("dataset.id = m.id"));
        assert!(INDEX_TEMPLATE.contains("textContent"));
    }

    #[test]
    fn test_render_empty_ledger() {
        let html = render_index(&[], &Balances::default());

        assert!(html.contains("No hay movimientos"));
        assert!(html.contains("0.00"));
    }
}
