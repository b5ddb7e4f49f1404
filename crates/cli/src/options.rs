//! `promolens options`: filter values present in the data.

use std::path::PathBuf;

use promolens_analytics::load;
use promolens_analytics::options::FilterOptions;

use crate::exit_codes::EXIT_ERROR;
use crate::CliError;

pub fn cmd_options(data_path: PathBuf, json_output: bool) -> Result<(), CliError> {
    let records = load::from_path(&data_path)?;
    let options = FilterOptions::from_records(&records);

    if json_output {
        let json = serde_json::to_string_pretty(&options)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    print_list("locations", &options.locations);
    print_list("categories", &options.categories);
    print_list("products", &options.products);
    print_list("sold by", &options.sold_by);
    print_list("payment methods", &options.payment_methods);
    Ok(())
}

fn print_list(title: &str, values: &[String]) {
    println!("{title} ({}):", values.len());
    for value in values {
        println!("  {value}");
    }
}
