use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::RngCore;

use catbot::{
    init_tracing, load_collaborators, respond_line, Catbot, DecoderConfig, ModelDims, Policy,
    ReplStep,
};
use catbot_core::make_rng;

/// Talk to Catbot from the terminal.
#[derive(Parser, Debug)]
#[command(name = "chat", version, about)]
struct Args {
    /// little-endian f32 weight blob
    #[arg(long, default_value = "models/catbot.bin")]
    weights: PathBuf,
    /// JSON word-index vocabulary
    #[arg(long, default_value = "models/vocab.json")]
    vocab: PathBuf,
    /// decoder config JSON (overrides --policy)
    #[arg(long)]
    config: Option<PathBuf>,
    /// decoding policy preset: serving or offline
    #[arg(long, default_value = "serving")]
    policy: Policy,
    /// seed for reproducible replies
    #[arg(long)]
    seed: Option<u64>,
    /// model output width
    #[arg(long, default_value_t = 15000)]
    vocab_size: usize,
    /// model embedding width
    #[arg(long, default_value_t = 96)]
    embed_dim: usize,
    /// one-shot prompt; starts a REPL when empty
    prompt: Vec<String>,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let config = match DecoderConfig::resolve(args.config.as_deref(), args.policy) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let dims = ModelDims {
        vocab_size: args.vocab_size,
        embed_dim: args.embed_dim,
        positions: config.max_length,
    };
    let (model, tokenizer) = load_collaborators(&args.weights, &args.vocab, dims);
    let bot = match Catbot::new(model, tokenizer, config) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if !bot.is_ready() {
        eprintln!("model or tokenizer failed to load, see log above");
        return ExitCode::FAILURE;
    }

    let mut rng: Box<dyn RngCore> = match args.seed {
        Some(seed) => Box::new(make_rng(seed)),
        None => Box::new(rand::thread_rng()),
    };

    if !args.prompt.is_empty() {
        let prompt = args.prompt.join(" ");
        println!("> {prompt}");
        println!("{}", bot.generate_response_with(&prompt, &mut rng));
        return ExitCode::SUCCESS;
    }

    println!("Catbot chat. Type 'quit' to exit.");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print!("You: ");
    let _ = stdout.flush();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let step = respond_line(&bot, &line, &mut rng);
        println!("Chatbot: {}", step.text());
        if let ReplStep::Quit(_) = step {
            break;
        }
        print!("You: ");
        let _ = stdout.flush();
    }
    ExitCode::SUCCESS
}
