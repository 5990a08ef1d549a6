use colored::Colorize;
use comfy_table::Table;

use crate::catalog::Catalog;

/// Hidden categories are listed only when `all` is set.
pub fn format_categories(catalog: &Catalog, all: bool) -> String {
    let mut table = Table::new();
    table.set_header(vec!["ID", "", "Name", "Color", "Hidden"]);
    for c in catalog.categories().iter().filter(|c| all || !c.is_hidden) {
        let hidden = if c.is_hidden { "yes".dimmed().to_string() } else { String::new() };
        table.add_row(vec![
            c.id.clone(),
            c.emoji.clone(),
            c.name.clone(),
            c.color.clone(),
            hidden,
        ]);
    }
    table.to_string()
}

pub fn run(all: bool) {
    println!("{}", format_categories(&Catalog::standard(), all));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_only_with_all() {
        let catalog = Catalog::standard();
        let visible = format_categories(&catalog, false);
        assert!(visible.contains("Travel"));
        assert!(!visible.contains("Personal Expenses"));

        let all = format_categories(&catalog, true);
        assert!(all.contains("Personal Expenses"));
    }
}
