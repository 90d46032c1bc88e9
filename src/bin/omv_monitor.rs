use clap::{Args, Parser, Subcommand};
use omv_monitor::config::AppConfig;
use omv_monitor::monitoring::application::{
    dashboard::{Dashboard, DashboardSnapshot},
    scheduler::MonitoringScheduler,
    settings::{MonitoringService, MonitoringSettings},
};
use omv_monitor::monitoring::domain::{
    monitoring_config::MonitoringConfig,
    ports::{CredentialStore, NetworkIdentity, PeriodicTrigger},
};
use omv_monitor::monitoring::infrastructure::{
    credential_store::{EnvSecretStore, FileCredentialStore},
    network::{StaticNetworkIdentity, TcpGatewayIdentity},
    notification::TracingNotificationSink,
    trigger::TokioTrigger,
};
use omv_monitor::{
    Credentials, HttpTransport, OmvClient, OmvError, OmvHost, OmvPassword, OmvPort, OmvResult,
    OmvUsername, RpcTransport,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Time a triggered check may take before it is abandoned.
const EXECUTION_WINDOW: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "omv-monitor")]
#[command(version, about = "Health and storage monitoring for an openmediavault server")]
struct Cli {
    #[arg(long, default_value = "./omv-monitor.yaml")]
    config: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify a login and save it (the password stays in the environment)
    Login(LoginArgs),
    /// Forget the saved login
    Logout,
    /// Run one monitoring check now
    Check,
    /// Run monitoring checks on schedule until Ctrl+C
    Watch,
    /// Show CPU, memory, filesystems and pending updates
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Install pending updates
    Update,
    /// Shut the server down
    Shutdown,
    /// Reboot the server
    Reboot,
    /// Send a test notification
    TestNotification,
    /// Show or change the alert switches
    Alerts {
        #[command(subcommand)]
        command: AlertsCommand,
    },
    /// Print an example configuration file
    PrintDefaultConfig,
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    host: String,
    #[arg(long, default_value = "80")]
    port: String,
    #[arg(long)]
    username: String,
}

#[derive(Subcommand, Debug)]
enum AlertsCommand {
    /// Print the current settings
    Show,
    /// Server availability alerts
    Health {
        #[command(subcommand)]
        state: Switch,
    },
    /// Storage capacity alerts
    Storage {
        #[command(subcommand)]
        state: StorageSwitch,
    },
}

#[derive(Subcommand, Debug)]
enum Switch {
    On,
    Off,
}

#[derive(Subcommand, Debug)]
enum StorageSwitch {
    On {
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
        threshold: Option<u8>,
    },
    Off,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Command::PrintDefaultConfig = cli.command {
        println!("{}", AppConfig::example_yaml());
        return;
    }

    let cfg = match AppConfig::load_from_file(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli.command, cfg).await {
        error!(error = %err, "command failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Shared pieces every command is built from.
struct App {
    cfg: AppConfig,
    transport: Arc<dyn RpcTransport>,
    credentials: Arc<FileCredentialStore<EnvSecretStore>>,
}

impl App {
    fn new(cfg: AppConfig) -> OmvResult<Self> {
        let credentials = Arc::new(FileCredentialStore::new(
            cfg.profile_file.clone(),
            EnvSecretStore::new(cfg.password_env.clone()),
        ));
        Ok(Self {
            transport: Arc::new(HttpTransport::new()?),
            credentials,
            cfg,
        })
    }

    fn client(&self) -> OmvResult<OmvClient> {
        OmvClient::builder()
            .config(self.cfg.client.clone())
            .transport(self.transport.clone())
            .build()
    }

    /// A client logged in with the saved credentials.
    async fn connected_client(&self) -> OmvResult<OmvClient> {
        let credentials = self.credentials.load().await?.ok_or_else(|| {
            OmvError::Config(format!(
                "no saved login; run `omv-monitor login` and set ${}",
                self.cfg.password_env
            ))
        })?;
        let client = self.client()?;
        client.login(&credentials).await?;
        Ok(client)
    }

    async fn settings(&self) -> OmvResult<Arc<MonitoringSettings>> {
        let settings =
            MonitoringSettings::load(&self.cfg.settings_file, self.cfg.monitoring.clone()).await?;
        Ok(Arc::new(settings))
    }

    fn network(&self) -> Arc<dyn NetworkIdentity> {
        match &self.cfg.network.gateway {
            Some(gateway) => Arc::new(TcpGatewayIdentity::new(
                gateway.clone(),
                self.cfg.network.probe_timeout,
            )),
            None => Arc::new(StaticNetworkIdentity(true)),
        }
    }

    fn scheduler(
        &self,
        settings: Arc<MonitoringSettings>,
        trigger: Arc<dyn PeriodicTrigger>,
    ) -> OmvResult<MonitoringScheduler> {
        Ok(MonitoringScheduler::new(
            settings,
            self.credentials.clone(),
            Arc::new(TracingNotificationSink),
            self.network(),
            trigger,
        )?
        .with_transport(self.transport.clone())
        .with_client_config(self.cfg.client.clone()))
    }
}

async fn run(command: Command, cfg: AppConfig) -> OmvResult<()> {
    let app = App::new(cfg)?;

    match command {
        Command::Login(args) => login(&app, args).await,
        Command::Logout => {
            app.credentials.clear().await?;
            info!("saved login removed");
            Ok(())
        }
        Command::Check => {
            let scheduler = app.scheduler(app.settings().await?, Arc::new(TokioTrigger::new()))?;
            let report = scheduler.handle_trigger(None).await;
            println!("{:?}", report.outcome);
            Ok(())
        }
        Command::Watch => watch_loop(&app).await,
        Command::Status { json } => {
            let dashboard = Dashboard::new(app.connected_client().await?);
            let snapshot = dashboard.refresh().await;
            dashboard.client().disconnect().await;
            if json {
                let text = serde_json::to_string_pretty(&snapshot)
                    .map_err(|e| OmvError::Config(e.to_string()))?;
                println!("{}", text);
            } else {
                print_snapshot(&snapshot);
            }
            Ok(())
        }
        Command::Update => {
            let dashboard = Dashboard::new(app.connected_client().await?);
            report_action(dashboard.apply_updates().await.message, &dashboard).await
        }
        Command::Shutdown => {
            let dashboard = Dashboard::new(app.connected_client().await?);
            report_action(dashboard.shutdown().await.message, &dashboard).await
        }
        Command::Reboot => {
            let dashboard = Dashboard::new(app.connected_client().await?);
            report_action(dashboard.reboot().await.message, &dashboard).await
        }
        Command::TestNotification => {
            let scheduler = app.scheduler(app.settings().await?, Arc::new(TokioTrigger::new()))?;
            scheduler.send_test_notification();
            Ok(())
        }
        Command::Alerts { command } => alerts(&app, command).await,
        Command::PrintDefaultConfig => {
            println!("{}", AppConfig::example_yaml());
            Ok(())
        }
    }
}

async fn login(app: &App, args: LoginArgs) -> OmvResult<()> {
    let password = std::env::var(&app.cfg.password_env).map_err(|_| {
        OmvError::Config(format!("set ${} to the password", app.cfg.password_env))
    })?;
    let credentials = Credentials::from_parts(
        OmvHost::new(args.host)?,
        OmvPort::parse(&args.port)?,
        OmvUsername::new(args.username)?,
        OmvPassword::new(password, app.cfg.password_score())?,
    )?;

    let client = app.client()?;
    client.login(&credentials).await?;
    client.disconnect().await;

    app.credentials.save(&credentials).await?;
    info!(endpoint = %credentials.endpoint(), "login saved");
    Ok(())
}

async fn watch_loop(app: &App) -> OmvResult<()> {
    let trigger = Arc::new(TokioTrigger::new());
    let settings = app.settings().await?;
    let scheduler = Arc::new(app.scheduler(settings.clone(), trigger.clone())?);
    scheduler.register();

    // Always armed: each run re-reads the settings file, so `alerts health
    // on|off` from another process decides whether a run does any work.
    let config = settings.snapshot().await;
    trigger.schedule_next(config.check_interval);
    if !config.health_alerts_enabled {
        info!("health alerts are disabled; enable them with `omv-monitor alerts health on`");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner = {
        let trigger = trigger.clone();
        tokio::spawn(async move { trigger.run(EXECUTION_WINDOW, shutdown_rx).await })
    };

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to wait for Ctrl+C");
    }
    info!("shutting down");
    shutdown_tx.send_replace(true);
    if let Err(err) = runner.await {
        error!(error = %err, "trigger task failed");
    }
    Ok(())
}

async fn alerts(app: &App, command: AlertsCommand) -> OmvResult<()> {
    let service = MonitoringService::new(app.settings().await?, Arc::new(TokioTrigger::new()));
    let config = match command {
        AlertsCommand::Show => service.settings().snapshot().await,
        AlertsCommand::Health { state: Switch::On } => service.enable_health_alerts().await?,
        AlertsCommand::Health { state: Switch::Off } => service.disable_health_alerts().await?,
        AlertsCommand::Storage {
            state: StorageSwitch::On { threshold },
        } => {
            let current = service.settings().snapshot().await;
            service
                .enable_storage_alerts(threshold.unwrap_or(current.storage_threshold_percent))
                .await?
        }
        AlertsCommand::Storage {
            state: StorageSwitch::Off,
        } => service.disable_storage_alerts().await?,
    };
    print_settings(&config);
    Ok(())
}

async fn report_action(message: String, dashboard: &Dashboard) -> OmvResult<()> {
    println!("{}", message);
    let failed = dashboard
        .snapshot()
        .await
        .action_status
        .is_some_and(|status| status.is_error);
    dashboard.client().disconnect().await;
    if failed {
        return Err(OmvError::Config(message));
    }
    Ok(())
}

fn print_settings(config: &MonitoringConfig) {
    println!("health alerts:  {}", on_off(config.health_alerts_enabled));
    println!(
        "storage alerts: {} (threshold {}%)",
        on_off(config.storage_alerts_enabled),
        config.storage_threshold_percent
    );
    println!(
        "check interval: {}",
        humantime::format_duration(config.check_interval)
    );
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

fn print_snapshot(snapshot: &DashboardSnapshot) {
    match snapshot.cpu {
        Some(cpu) => println!("CPU:    {:.1}%", cpu.current_usage),
        None => println!("CPU:    n/a"),
    }
    match snapshot.memory {
        Some(memory) => println!(
            "Memory: {:.1}% ({:.2} / {:.2} GiB)",
            memory.used_percentage(),
            memory.used_gb(),
            memory.total_gb()
        ),
        None => println!("Memory: n/a"),
    }
    if !snapshot.filesystems.is_empty() {
        println!("Filesystems:");
        for fs in &snapshot.filesystems {
            println!(
                "  {:<16} {:>3}%  used {}  free {}  [{:?}]",
                fs.name,
                fs.percentage,
                fs.used_capacity,
                fs.available_capacity,
                fs.severity()
            );
        }
    }
    match &snapshot.updates {
        Some(updates) if updates.available => {
            println!("Updates: {} pending", updates.count);
            for name in &updates.package_names {
                println!("  {}", name);
            }
        }
        Some(_) => println!("Updates: none"),
        None => println!("Updates: n/a"),
    }
}
