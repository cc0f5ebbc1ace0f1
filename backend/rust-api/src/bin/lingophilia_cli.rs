use anyhow::{bail, Context};
use std::io::{self, BufRead, Write};

use lingophilia_api::{
    error::GenerationError,
    services::{
        generation_client::{GenerationClient, ProxyClient},
        scramble_service::{arrange_by_positions, score_order, shuffle_parts},
        share::share_url,
        stats_service::StatsStore,
        storage::FileBackend,
    },
};

const USAGE: &str = "usage: lingophilia-cli [--url <proxy base url>] [--stats <file>] <quiz|scramble|stats|share>";

struct Args {
    url: String,
    stats_path: String,
    command: String,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut url =
        std::env::var("LINGOPHILIA_URL").unwrap_or_else(|_| "http://localhost:8081".to_string());
    let mut stats_path = std::env::var("LINGOPHILIA_STATS")
        .unwrap_or_else(|_| ".lingophilia_stats.json".to_string());
    let mut command = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--url" => url = args.next().context(USAGE)?,
            "--stats" => stats_path = args.next().context(USAGE)?,
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other if command.is_none() => command = Some(other.to_string()),
            other => bail!("unexpected argument '{}'\n{}", other, USAGE),
        }
    }

    Ok(Args {
        url,
        stats_path,
        command: command.context(USAGE)?,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = parse_args()?;
    let store = StatsStore::new(FileBackend::new(&args.stats_path));

    match args.command.as_str() {
        "quiz" => {
            let client = ProxyClient::new(&args.url)?;
            run_quiz(&client, &store).await
        }
        "scramble" => {
            let client = ProxyClient::new(&args.url)?;
            run_scramble(&client, &store).await
        }
        "stats" => {
            let stats = store.load()?;
            println!("Accuracy:            {}%", stats.accuracy());
            println!("Quiz score:          {}", stats.quiz_score);
            println!("Quizzes completed:   {}", stats.quizzes_completed);
            println!("Scrambles completed: {}", stats.scramble_completed);
            Ok(())
        }
        "share" => {
            println!("{}", share_url(&store.load()?));
            Ok(())
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }
}

async fn run_quiz(client: &ProxyClient, store: &StatsStore<FileBackend>) -> anyhow::Result<()> {
    println!("Preparing inquiry...");
    let question = client.request_quiz().await.map_err(report)?;

    println!("\n  {}\n", question.word);
    for (index, option) in question.options.iter().enumerate() {
        println!("  {}. {}", index + 1, option);
    }

    let choice = loop {
        let line = prompt("\nYour answer (1-4): ")?;
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=question.options.len()).contains(&n) => break n - 1,
            _ => println!("Please enter a number between 1 and {}.", question.options.len()),
        }
    };

    let correct = question.is_correct(&question.options[choice]);
    let stats = store.record_quiz_answer(correct)?;

    if correct {
        println!("\nCorrect.");
    } else {
        println!("\nIncorrect. Answer: {}", question.correct_answer);
    }

    for (label, value) in question.etymology.components() {
        println!("  {:<7} {}", label, value);
    }
    println!("\n{}", question.etymology.explanation);
    for family in &question.family_words {
        println!("  - {}: {}", family.word, family.meaning);
    }
    println!(
        "\n{} / {} correct so far",
        stats.quiz_score, stats.quizzes_completed
    );
    Ok(())
}

async fn run_scramble(
    client: &ProxyClient,
    store: &StatsStore<FileBackend>,
) -> anyhow::Result<()> {
    println!("Composing an academic context...");
    let passage = client.request_passage().await.map_err(report)?;
    let items = shuffle_parts(&passage.parts);

    println!("\nTopic: {}\n", passage.topic);
    for (index, part) in items.iter().enumerate() {
        println!("  {}. {}", index + 1, part.text);
    }

    let arranged = loop {
        let line = prompt(&format!(
            "\nEnter the correct order as numbers 1-{} separated by spaces: ",
            items.len()
        ))?;
        let positions: Result<Vec<usize>, _> =
            line.split_whitespace().map(str::parse::<usize>).collect();
        match positions.ok().and_then(|p| arrange_by_positions(&items, &p)) {
            Some(arranged) => break arranged,
            None => println!("Use each number exactly once."),
        }
    };

    let score = score_order(&passage.parts, &arranged);
    store.record_scramble()?;

    println!("\nScore: {}%\n", score);
    println!("{}\n", passage.full_text);
    println!("{}\n", passage.explanation);
    println!("{}", passage.translation);
    Ok(())
}

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("input closed");
    }
    Ok(line)
}

fn report(err: GenerationError) -> anyhow::Error {
    tracing::error!("Generation failed: {}", err);
    anyhow::anyhow!("{} ({})", err.user_message(), err)
}
