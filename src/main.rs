use clap::Parser;
use contribute::application::facts::FactProvider;
use contribute::application::orchestrator::{CheckoutOrchestrator, CheckoutSettings, SubmitOutcome};
use contribute::application::readiness::{GatewayReadinessMonitor, GatewayScript};
use contribute::config::Config;
use contribute::domain::amount::{DEFAULT_PRESET, DEFAULT_TIP};
use contribute::domain::ports::{OrderServiceBox, PaymentGatewayRef};
use contribute::infrastructure::http::{GeminiFactSource, HttpOrderService};
use contribute::infrastructure::in_memory::InMemoryOrderService;
use contribute::interfaces::terminal::gateway::TerminalGateway;
use contribute::interfaces::terminal::render;
use miette::{IntoDiagnostic, Result, miette};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

const OFFLINE_GATEWAY_KEY: &str = "rzp_offline";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Preset contribution in rupees (1000, 2500 or 4000)
    #[arg(long, default_value_t = DEFAULT_PRESET)]
    amount: u32,

    /// Any other amount; overrides the preset
    #[arg(long)]
    custom_amount: Option<String>,

    /// Tip percentage (0, 5, 10 or 18)
    #[arg(long, default_value_t = DEFAULT_TIP)]
    tip: u32,

    #[arg(long, default_value = "")]
    name: String,

    #[arg(long, default_value = "")]
    email: String,

    /// 10-digit mobile number
    #[arg(long, default_value = "")]
    mobile: String,

    #[arg(long)]
    address: Option<String>,

    /// Withhold name, email and mobile from the payment gateway
    #[arg(long)]
    anonymous: bool,

    /// Use the in-process order backend and built-in facts instead of the
    /// configured endpoints
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries the checkout dialogue.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let input = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let gateway: PaymentGatewayRef = Arc::new(TerminalGateway::new(input.clone()));

    let checkout = if cli.offline {
        info!("Running offline");
        let orders: OrderServiceBox = Box::new(InMemoryOrderService::new());
        CheckoutOrchestrator::new(
            CheckoutSettings::new(OFFLINE_GATEWAY_KEY),
            GatewayReadinessMonitor::new(gateway, GatewayScript::global()),
            orders,
            FactProvider::offline(),
        )
    } else {
        let config = Config::from_env().into_diagnostic()?;
        let orders: OrderServiceBox = Box::new(
            HttpOrderService::new(&config.api_url, config.order_timeout).into_diagnostic()?,
        );
        let facts = GeminiFactSource::new(
            &config.fact_api_url,
            &config.fact_api_key,
            config.fact_timeout,
        )
        .into_diagnostic()?;

        let mut settings = CheckoutSettings::new(&config.gateway_key);
        settings.ready_timeout = config.gateway_ready_timeout;
        CheckoutOrchestrator::new(
            settings,
            GatewayReadinessMonitor::new(gateway, GatewayScript::global())
                .with_poll_interval(config.gateway_poll_interval),
            orders,
            FactProvider::new(Box::new(facts)).with_timeout(config.fact_timeout),
        )
    };

    // Fill in the form
    checkout.select_preset(cli.amount).await.into_diagnostic()?;
    if let Some(custom) = &cli.custom_amount {
        checkout.choose_other_amount().await.into_diagnostic()?;
        checkout.set_custom_amount(custom).await.into_diagnostic()?;
    }
    checkout.set_tip(cli.tip).await.into_diagnostic()?;
    checkout
        .update_contributor(|contributor| {
            contributor.name = cli.name.clone();
            contributor.email = cli.email.clone();
            contributor.mobile = cli.mobile.clone();
            contributor.address = cli.address.clone().unwrap_or_default();
            contributor.anonymous = cli.anonymous;
        })
        .await
        .into_diagnostic()?;

    let session = checkout.snapshot().await;
    print!("{}", render::render_summary(&session));
    println!("{}", session.submit_label());

    match checkout.submit().await {
        SubmitOutcome::Confirmed(confirmation) => {
            print!("{}", render::render_confirmation(&confirmation));
            println!("Press Enter to close.");
            // End of input closes the confirmation just the same.
            let _ = input.lock().await.next_line().await;
            checkout.acknowledge().await.into_diagnostic()?;
            Ok(())
        }
        SubmitOutcome::Cancelled => Err(miette!("Payment cancelled")),
        SubmitOutcome::Invalid(_) | SubmitOutcome::Failed(_) => {
            eprint!("{}", render::render_problems(&checkout.snapshot().await));
            Err(miette!("Checkout did not complete"))
        }
        SubmitOutcome::Ignored(state) => Err(miette!("Checkout is busy ({state})")),
    }
}
