pub mod cli;
pub mod error;
pub mod reader;
pub mod value;
pub mod writer;

pub fn get_input_extensions() -> Vec<String> {
    vec![".xls".to_string(), ".xlsx".to_string()]
}

pub fn get_output_types() -> Vec<String> {
    vec!["tsv".to_string(), "xlsx".to_string()]
}
