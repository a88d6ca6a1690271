//! Command-line front-end for the lesson booking client.
//!
//! Drives the same store and reducer a UI would: every command is a
//! sequence of actions, and output is read back from state.

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use lesson_booking::api::{HttpLessonApi, InMemoryLessonApi, LessonApi};
use lesson_booking::catalog::demo_lessons;
use lesson_booking::checkout::CheckoutField;
use lesson_booking::reconciler::{OrderOutcome, submit_order};
use lesson_booking::sorting::SortCriterion;
use lesson_booking::{
    BookingAction, BookingConfig, BookingEnvironment, BookingReducer, BookingState, BookingStore,
    Lesson,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long one command may wait for the service
const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Parser)]
#[command(name = "lesson-booking", version, about = "Browse and book music lessons")]
struct Cli {
    /// Base URL of the lesson service
    #[arg(long, env = "BOOKING_BACKEND_URL")]
    backend_url: Option<String>,

    /// Use the built-in demo lessons instead of the service
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every lesson
    List(SortArgs),

    /// Search lessons by subject, location, price or spaces
    Search {
        /// Text to search for
        query: String,

        #[command(flatten)]
        sort: SortArgs,
    },

    /// Book one space per listed lesson id (repeat an id for more) and order
    Book {
        /// Lesson ids
        #[arg(required = true)]
        lessons: Vec<String>,

        /// Customer name, letters only
        #[arg(long)]
        name: String,

        /// Customer phone, digits only
        #[arg(long)]
        phone: String,

        /// Customer email
        #[arg(long, default_value = "")]
        email: String,
    },
}

#[derive(Debug, Args)]
struct SortArgs {
    /// subject, location, price or spaces
    #[arg(long, default_value = "subject")]
    sort: SortCriterion,

    /// Largest first
    #[arg(long)]
    descending: bool,
}

async fn dispatch(store: &BookingStore, action: BookingAction) -> anyhow::Result<()> {
    let mut handle = store.send(action).await?;
    handle
        .wait_with_timeout(COMMAND_TIMEOUT)
        .await
        .context("timed out waiting for the lesson service")?;
    Ok(())
}

async fn apply_sort(store: &BookingStore, args: &SortArgs) -> anyhow::Result<()> {
    dispatch(store, BookingAction::SetSortCriterion { criterion: args.sort }).await?;
    if args.descending {
        dispatch(store, BookingAction::ToggleSortOrder).await?;
    }
    Ok(())
}

fn print_lessons(lessons: &[Lesson]) {
    if lessons.is_empty() {
        println!("No lessons found.");
        return;
    }
    println!("{:<26} {:<12} {:<12} {:>8} {:>6}", "ID", "SUBJECT", "LOCATION", "PRICE", "SPACES");
    for lesson in lessons {
        println!(
            "{:<26} {:<12} {:<12} {:>8} {:>6}",
            lesson.id.as_str(),
            lesson.subject,
            lesson.location,
            lesson.price.to_string(),
            lesson.spaces
        );
    }
}

async fn book(
    store: &BookingStore,
    lessons: Vec<String>,
    name: String,
    phone: String,
    email: String,
) -> anyhow::Result<()> {
    for lesson_id in lessons {
        let before = store.state(BookingState::total_items).await;
        dispatch(store, BookingAction::AddToCart { lesson_id: lesson_id.clone().into() }).await?;
        if store.state(BookingState::total_items).await == before {
            println!("Could not add lesson {lesson_id}: unknown or fully booked");
        }
    }

    for (field, value) in [
        (CheckoutField::Name, name),
        (CheckoutField::Phone, phone),
        (CheckoutField::Email, email),
    ] {
        dispatch(store, BookingAction::UpdateCheckout { field, value }).await?;
    }

    let (items, total) = store.state(|s| (s.total_items(), s.cart_total())).await;
    println!("Submitting {items} space(s) for {total}...");
    match submit_order(store, COMMAND_TIMEOUT)
        .await
        .context("order did not settle")?
    {
        OrderOutcome::Placed(confirmation) => {
            println!("{}", confirmation.message());
            Ok(())
        },
        OrderOutcome::Rejected(reason) => bail!(reason),
        OrderOutcome::Failed(error) => bail!("Error submitting order. Please try again. ({error})"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = BookingConfig::from_env();
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let api: Arc<dyn LessonApi> = if cli.offline {
        Arc::new(InMemoryLessonApi::new(demo_lessons()))
    } else {
        Arc::new(
            HttpLessonApi::from_config(&config)
                .context("invalid lesson service configuration")?,
        )
    };
    tracing::info!(backend = %config.backend_url, offline = cli.offline, "Starting");

    // A command ends once its effects settle; nothing is on screen to dismiss
    let env =
        BookingEnvironment::from_config(&config, api).with_confirmation_display(Duration::ZERO);
    let store = BookingStore::new(BookingState::default(), BookingReducer::new(), env);

    dispatch(&store, BookingAction::RefreshLessons).await?;

    match cli.command {
        Command::List(sort) => {
            apply_sort(&store, &sort).await?;
            print_lessons(&store.state(BookingState::sorted_lessons).await);
        },
        Command::Search { query, sort } => {
            apply_sort(&store, &sort).await?;
            dispatch(&store, BookingAction::Search { query }).await?;
            print_lessons(&store.state(BookingState::sorted_lessons).await);
        },
        Command::Book {
            lessons,
            name,
            phone,
            email,
        } => book(&store, lessons, name, phone, email).await?,
    }

    let drifted = store.state(|s| s.outbox.drifted()).await;
    if !drifted.is_empty() {
        tracing::warn!(?drifted, "Some space counts could not be written to the service");
    }

    store.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
