use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    form::package_option_label, load_settings, FlowEvent, HttpStorefrontBackend,
    OrderFlowController, OrderFormState, PollOutcome, StorefrontBackend,
};
use shared::domain::{Currency, OrderId, CATALOG, DEFAULT_PACKAGE_CODE};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "MLBB diamond top-up storefront")]
struct Args {
    /// Overrides `backend_url` from storefront.toml and the environment.
    #[arg(long, global = true)]
    backend_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List diamond packages with unit prices.
    Catalog {
        #[arg(long, default_value = "IDR", value_parser = parse_currency)]
        currency: Currency,
    },
    /// Create an order. With --pay, open payment and follow it to delivery.
    Order {
        #[arg(long)]
        player_id: String,
        #[arg(long, default_value_t = 1)]
        zone: u32,
        #[arg(long, default_value = DEFAULT_PACKAGE_CODE)]
        package: String,
        #[arg(long, default_value_t = 1)]
        qty: u32,
        #[arg(long, default_value = "IDR", value_parser = parse_currency)]
        currency: Currency,
        #[arg(long)]
        pay: bool,
    },
    /// Ask the backend for an order's current status once.
    Status {
        #[arg(long)]
        order_id: String,
    },
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    Currency::parse(raw).ok_or_else(|| format!("unsupported currency {raw}; use IDR or MYR"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.backend_url {
        settings.backend_url = url;
    }

    match args.command {
        Command::Catalog { currency } => {
            for package in CATALOG.iter() {
                println!("{:<10} {}", package.code, package_option_label(package, currency));
            }
            Ok(())
        }
        Command::Order {
            player_id,
            zone,
            package,
            qty,
            currency,
            pay,
        } => {
            let mut form = OrderFormState::new();
            form.set_player_id(player_id);
            form.set_zone(zone);
            form.select_package(&package);
            form.set_quantity(qty);
            form.set_currency(currency);

            let backend: Arc<dyn StorefrontBackend> =
                Arc::new(HttpStorefrontBackend::new(&settings.backend_url)?);
            let controller = OrderFlowController::new(backend, settings.poll_config());
            let result = run_order(&controller, &form, pay).await;
            controller.shutdown();
            result
        }
        Command::Status { order_id } => {
            let backend = HttpStorefrontBackend::new(&settings.backend_url)?;
            let response = backend.order_status(&OrderId(order_id)).await?;
            match response.status {
                Some(status) => println!("status: {status}"),
                None => println!("status: -"),
            }
            if let Some(detail) = response.detail {
                println!("detail: {detail}");
            }
            Ok(())
        }
    }
}

async fn run_order(
    controller: &Arc<OrderFlowController>,
    form: &OrderFormState,
    pay: bool,
) -> Result<()> {
    for (label, value) in form.summary().rows() {
        println!("{label:<10} {value}");
    }

    let order = controller.create_order(form.draft()).await?;
    println!("{}", controller.snapshot().message);
    println!("order id: {}", order.order_id);
    if let Some(pay_url) = &order.pay_url {
        println!("pay url:  {pay_url}");
    }
    if !pay {
        return Ok(());
    }

    let mut events = controller.subscribe_events();
    if controller.pay_now().is_none() {
        bail!("{}", controller.snapshot().message);
    }

    let outcome = tokio::select! {
        outcome = follow_poll(&mut events, &order.order_id) => outcome?,
        _ = tokio::signal::ctrl_c() => {
            warn!(order_id = %order.order_id, "interrupted while waiting for payment");
            return Ok(());
        }
    };
    match outcome {
        PollOutcome::Failed { .. } | PollOutcome::Errored(_) => bail!("{}", outcome.message()),
        _ => Ok(()),
    }
}

/// Prints status copy until the poll run for `order_id` reports its outcome.
async fn follow_poll(
    events: &mut broadcast::Receiver<FlowEvent>,
    order_id: &OrderId,
) -> Result<PollOutcome> {
    loop {
        match events.recv().await {
            Ok(FlowEvent::StatusMessage(message)) => println!("{message}"),
            Ok(FlowEvent::PollProgress { attempt, .. }) => debug!(attempt, "polling order status"),
            Ok(FlowEvent::PollFinished {
                order_id: finished,
                outcome,
            }) if &finished == order_id => return Ok(outcome),
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "missed flow events"),
            Err(RecvError::Closed) => bail!("order flow stopped before the poll finished"),
        }
    }
}
