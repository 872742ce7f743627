use clap::Parser;

/// Assembles the campaign expenditure dashboard from its data sources.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the sources and the map. If not provided, the
    /// routes of the expenditure API at http://localhost:5000 are used with the default map of
    /// Rio Grande do Sul.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (URL, optional) The base URL of the expenditure API. Overrides the one in the configuration file.
    #[clap(short, long, value_parser)]
    pub base_url: Option<String>,

    /// (text, optional) Only show the municipalities whose name contains this text in the table.
    #[clap(short, long, value_parser)]
    pub query: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the dashboard in JSON format.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference dashboard in JSON format. If provided, the program checks that the
    /// generated dashboard matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
