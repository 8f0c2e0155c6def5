mod fetch;

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;

use parrot_core::model::brain::Brain;
use parrot_core::model::generator::Generator;

/// Build a chat mimic from corpus files or a remote posts API, then
/// generate sentences interactively.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Corpus text files, one training phrase per line
    corpus: Vec<PathBuf>,

    /// Remote posts API returning a JSON array of strings
    #[arg(long)]
    fetch_url: Option<String>,

    /// Where fetched posts are cached as raw text
    #[arg(long, default_value = "posts.txt")]
    fetch_cache: PathBuf,

    /// Upper bound on fetched posts
    #[arg(long, default_value_t = fetch::MAX_POSTS)]
    max_posts: usize,

    /// Words of context used to predict the next word
    #[arg(long, default_value_t = 2)]
    chain_length: usize,

    /// Maximum sampling steps per generated sentence
    #[arg(long, default_value_t = 10_000)]
    max_words: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let args = Args::parse();

    let mut brain: Option<Brain> = None;

    // Corpus files load through the binary cache and merge into one model
    for path in &args.corpus {
        let partial = Brain::load(path, args.chain_length)?;
        log::info!("loaded {} ({} contexts)", path.display(), partial.context_count());
        match brain.as_mut() {
            Some(b) => b.merge(&partial)?,
            None => brain = Some(partial),
        }
    }

    // Fetched posts are trained one phrase at a time, like live input
    if let Some(url) = &args.fetch_url {
        let posts = fetch::fetch_posts(url, &args.fetch_cache, args.max_posts)?;
        let mut target = match brain.take() {
            Some(b) => b,
            None => Brain::new(args.chain_length)?,
        };
        for post in &posts {
            target.train(post);
        }
        log::info!("trained on {} fetched posts", posts.len());
        brain = Some(target);
    }

    // Generating from an untrained model is undefined, refuse to start
    let brain = match brain {
        Some(b) if !b.is_empty() => b,
        _ => return Err("no training data, pass corpus files or --fetch-url".into()),
    };

    log::info!(
        "ready: {} contexts, {} observations",
        brain.context_count(),
        brain.observation_count()
    );

    let generator = Generator::with_max_words(args.max_words);
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let seed = line.trim();
        if seed.is_empty() {
            break;
        }

        println!("{}", generator.generate(&brain, seed));
    }

    Ok(())
}
