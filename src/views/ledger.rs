//! Farm ledger: income / expense totals and entry form

use super::format::{currency, date};
use super::layout::empty;
use crate::actions::{FormKind, Intent};
use crate::markup::Markup;
use crate::record::Record;
use crate::render::{hook, EventKind};
use crate::state::{AppState, Collection};

/// (income, expense) over all entries
pub fn totals(entries: &[Record]) -> (f64, f64) {
    entries.iter().fold((0.0, 0.0), |(income, expense), e| {
        let amount = e.number("amount").unwrap_or(0.0);
        match e.str("entry_type") {
            Some("income") => (income + amount, expense),
            _ => (income, expense + amount),
        }
    })
}

pub fn render(state: &AppState, _param: Option<&str>) -> Markup {
    let entries = state.collection(Collection::LedgerEntries);
    let (income, expense) = totals(entries);

    let list = if entries.is_empty() {
        empty("fa-book", "No entries yet", "Record sales and expenses to track profit.")
    } else {
        let rows: Markup = entries
            .iter()
            .map(|e| {
                let kind = e.text("entry_type").unwrap_or_else(|| "expense".to_string());
                markup!(
                    "<tr class=\"entry-{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    kind,
                    e.text("entry_date").map(|d| date(&d)),
                    e.text("description").unwrap_or_default(),
                    e.text("category").unwrap_or_default(),
                    currency(e.number("amount").unwrap_or(0.0))
                )
            })
            .collect();
        markup!(
            "<table class=\"ledger-table\"><thead><tr><th>Date</th><th>Description</th><th>Category</th><th>Amount</th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    markup!(
        "<div class=\"ledger-summary\"><div class=\"glass-card stat income\"><p>Income</p><h3>{}</h3></div><div class=\"glass-card stat expense\"><p>Expense</p><h3>{}</h3></div><div class=\"glass-card stat profit\"><p>Net</p><h3>{}</h3></div></div>\
         <form class=\"glass-card form-card\" {}>\
         <select name=\"entry_type\"><option value=\"income\">Income</option><option value=\"expense\">Expense</option></select>\
         <input name=\"description\" type=\"text\" placeholder=\"Description\" required>\
         <input name=\"category\" type=\"text\" placeholder=\"Category\">\
         <input name=\"amount\" type=\"number\" step=\"0.01\" required>\
         <input name=\"entry_date\" type=\"date\">\
         <button type=\"submit\" class=\"btn-primary\">Add entry</button></form>\
         <section class=\"glass-card\">{}</section>",
        currency(income),
        currency(expense),
        currency(income - expense),
        hook("ledger-form", EventKind::Submit, &Intent::Submit(FormKind::LedgerEntry)),
        list
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_split_by_type() {
        let entries = vec![
            Record::new().with("entry_type", "income").with("amount", 1200),
            Record::new().with("entry_type", "expense").with("amount", "300.5"),
            Record::new().with("entry_type", "income").with("amount", 800),
        ];
        assert_eq!(totals(&entries), (2000.0, 300.5));
    }
}
