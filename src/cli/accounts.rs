use comfy_table::Table;

use crate::catalog::Catalog;

pub fn format_accounts(catalog: &Catalog) -> String {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Institution", "Type", "Last Four"]);
    for a in catalog.accounts() {
        table.add_row(vec![
            a.id.clone(),
            a.name.clone(),
            a.institution.clone(),
            a.account_type.to_string(),
            format!("••{}", a.last_four),
        ]);
    }
    table.to_string()
}

pub fn run() {
    println!("{}", format_accounts(&Catalog::standard()));
}
