use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed XML attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Document has no root element")]
    NoRoot,

    #[error("Unexpected closing tag </{0}>")]
    UnexpectedClosingTag(String),

    #[error("Environment variable not found: {0}")]
    EnvVar(#[from] env::VarError),
}
