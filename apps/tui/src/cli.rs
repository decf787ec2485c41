use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "dashboard_tui", version, about = "Filterable chart dashboards")]
pub struct CliArgs {
    /// Dashboard to show: sales or education
    #[arg(long, value_name = "NAME")]
    pub variant: Option<String>,

    /// Sales records (path or URL)
    #[arg(long, value_name = "LOCATION")]
    pub data: Option<String>,

    /// County TopoJSON (path or URL)
    #[arg(long, value_name = "LOCATION")]
    pub topology: Option<String>,

    /// Education records (path or URL)
    #[arg(long, value_name = "LOCATION")]
    pub education: Option<String>,

    /// Filter key selected after loading
    #[arg(long, value_name = "KEY")]
    pub filter: Option<String>,

    /// Print stats and chart summaries and exit
    #[arg(long)]
    pub headless: bool,

    /// Print headless output as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Write logs to this file
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(variant) = &self.variant {
            std::env::set_var("DASHBOARD_VARIANT", variant);
        }
        if let Some(data) = &self.data {
            std::env::set_var("DASHBOARD_DATA", data);
        }
        if let Some(topology) = &self.topology {
            std::env::set_var("DASHBOARD_TOPOLOGY", topology);
        }
        if let Some(education) = &self.education {
            std::env::set_var("DASHBOARD_EDUCATION", education);
        }
        if let Some(path) = &self.log_file {
            std::env::set_var("DASHBOARD_LOG", path);
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }
}
