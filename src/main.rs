use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, warn};

use simple_file_retriever::{
    backend::{Connection, HttpBackend},
    config::AppConfig,
    domain::{AfterAcknowledge, OriginContext, Screen},
    logging,
    ui::{DownloadForm, FormAction, FormMessage},
    DownloadCoordinator,
};

#[derive(Parser, Debug)]
#[command(name = "simple-file-retriever")]
#[command(about = "Retrieve a file from the connected server", long_about = None)]
struct Cli {
    /// Name to save the file under in the download directory
    local_name: Option<String>,

    /// Name of the file on the server
    remote_name: Option<String>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the server base URL
    #[arg(short, long)]
    server: Option<String>,

    /// Override the download directory
    #[arg(short, long)]
    download_dir: Option<PathBuf>,

    /// Screen the flow was started from; "main" returns there, anything else
    /// goes to the user screen
    #[arg(long)]
    from: Option<String>,

    /// Seconds to wait for a retrieval, 0 to wait indefinitely
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Log filter (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(server) = &self.server {
            config.server.url = Some(server.clone());
        }
        if let Some(dir) = &self.download_dir {
            config.download_dir = dir.clone();
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }
    }
}

fn prompt(label: &str) -> String {
    print!("{}: ", label);
    let _ = io::stdout().flush();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(_) => line,
        Err(e) => {
            warn!("failed to read {}: {}", label, e);
            String::new()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };
    cli.apply_to(&mut config);

    let connection = Connection::new();
    if config.server.url.is_some() {
        match HttpBackend::connect(&config.server, config.download_dir.clone()).await {
            Ok(backend) => connection.open(backend).await,
            Err(e) => warn!("could not connect: {}", e),
        }
    }

    let coordinator = DownloadCoordinator::new(connection.clone()).with_timeout(config.timeout());
    let mut form = DownloadForm::new(OriginContext::from_extra(cli.from.as_deref()));

    let local_name = cli
        .local_name
        .clone()
        .unwrap_or_else(|| prompt("Local file name"));
    let remote_name = cli
        .remote_name
        .clone()
        .unwrap_or_else(|| prompt("Remote file name"));
    form.update(FormMessage::LocalNameChanged(local_name));
    form.update(FormMessage::RemoteNameChanged(remote_name));

    let FormAction::Submit {
        local_name,
        remote_name,
        origin,
    } = form.update(FormMessage::DownloadPressed)
    else {
        return ExitCode::FAILURE;
    };

    let directive = coordinator
        .handle_download(&local_name, &remote_name, origin)
        .await;

    if let FormAction::Show(directive) = form.update(FormMessage::Resolved(directive)) {
        println!("{}", directive.message);
        println!("[{}]", directive.action_label);
    }

    let succeeded = match form.update(FormMessage::Acknowledged) {
        FormAction::Navigate(AfterAcknowledge::NavigateTo(Screen::Main)) => {
            println!("-> main screen");
            true
        }
        FormAction::Navigate(AfterAcknowledge::NavigateTo(Screen::User)) => {
            println!("-> user screen");
            true
        }
        _ => {
            println!("(stay)");
            false
        }
    };

    connection.close().await;

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
