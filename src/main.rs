use std::io::{self, BufRead, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bibliofetch::modules::integrations::{OpenAiExpander, expand_topic};
use bibliofetch::services::summarize;
use bibliofetch::utils::{BarProgress, ProgressReporter, sanitize_dir_name};
use bibliofetch::{AcquisitionService, BookRequest, Config};

enum Mode {
    Topic,
    Book,
}

/// Print a label and read one trimmed line from stdin
fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn select_mode(args: &[String]) -> io::Result<Mode> {
    if args.iter().any(|a| a == "--topic") {
        return Ok(Mode::Topic);
    }
    if args.iter().any(|a| a == "--book") {
        return Ok(Mode::Book);
    }
    let answer = prompt("Search by (t)opic or by (b)ook? [b]: ")?;
    Ok(if answer.eq_ignore_ascii_case("t") || answer.eq_ignore_ascii_case("topic") {
        Mode::Topic
    } else {
        Mode::Book
    })
}

fn bar_progress() -> Box<dyn ProgressReporter> {
    Box::new(BarProgress::default())
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bibliofetch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let args: Vec<String> = std::env::args().collect();
    let mode = match select_mode(&args) {
        Ok(mode) => mode,
        Err(e) => {
            tracing::error!("Failed to read input: {}", e);
            return;
        }
    };

    let service = match AcquisitionService::new(config.clone()) {
        Ok(service) => service.with_progress(bar_progress),
        Err(e) => {
            tracing::error!("{}", e);
            return;
        }
    };

    let reports = match mode {
        Mode::Book => {
            let title = prompt("Enter the book title: ").unwrap_or_default();
            let author = prompt("Enter the author name: ").unwrap_or_default();
            let Some(request) = BookRequest::new(&title, &author) else {
                tracing::error!("Both a title and an author are required");
                return;
            };
            service.acquire_all(&[request], None).await
        }
        Mode::Topic => {
            let topic = prompt("Enter a topic: ").unwrap_or_default();
            if topic.is_empty() {
                tracing::error!("A topic is required");
                return;
            }

            let expander = match config
                .http_client()
                .map_err(|e| bibliofetch::AcquisitionError::Config(e.to_string()))
                .and_then(|client| OpenAiExpander::from_config(&config, client))
            {
                Ok(expander) => expander,
                Err(e) => {
                    tracing::error!("{}", e);
                    return;
                }
            };

            let books = match expand_topic(&expander, &topic, config.books_per_topic).await {
                Ok(books) => books,
                Err(e) => {
                    tracing::error!("Topic expansion failed: {}", e);
                    return;
                }
            };
            if books.is_empty() {
                tracing::warn!("No books suggested for '{}'", topic);
                return;
            }

            let topic_dir = config.output_dir.join(sanitize_dir_name(&topic));
            service.acquire_all(&books, Some(&topic_dir)).await
        }
    };

    println!("\n{}", summarize(&reports));
}
