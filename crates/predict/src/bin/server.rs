use std::io::Cursor;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use tiny_http::{Header, Request, Response, Server, StatusCode};

use catbot::{
    init_tracing, load_collaborators, route, Catbot, DecoderConfig, HttpReply, ModelDims, Policy,
};

/// Serve Catbot replies over HTTP.
#[derive(Parser, Debug)]
#[command(name = "server", version, about)]
struct Args {
    /// listen address
    #[arg(long, default_value = "0.0.0.0:5000")]
    addr: String,
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
    /// model output width
    #[arg(long, default_value_t = 15000)]
    vocab_size: usize,
    /// model embedding width
    #[arg(long, default_value_t = 96)]
    embed_dim: usize,
}

fn json_response(reply: HttpReply) -> Response<Cursor<Vec<u8>>> {
    let mut response =
        Response::from_string(reply.body).with_status_code(StatusCode(reply.status));
    let headers: [(&[u8], &[u8]); 2] = [
        (b"Content-Type", b"application/json"),
        (b"Access-Control-Allow-Origin", b"*"),
    ];
    for (name, value) in headers {
        if let Ok(h) = Header::from_bytes(name, value) {
            response.add_header(h);
        }
    }
    response
}

fn handle(bot: &Catbot, mut req: Request) {
    let url = req.url().to_string();
    let method = req.method().clone();
    tracing::debug!(%method, %url, "request");

    let mut body = String::new();
    if let Err(e) = req.as_reader().read_to_string(&mut body) {
        // an unreadable body routes like a malformed one
        tracing::warn!(error = %e, %url, "failed to read request body");
        body.clear();
    }
    let reply = route(bot, &method, &url, &body);

    if let Err(e) = req.respond(json_response(reply)) {
        tracing::warn!(error = %e, %url, "failed to send response");
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let config = match DecoderConfig::resolve(args.config.as_deref(), args.policy) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    let dims = ModelDims {
        vocab_size: args.vocab_size,
        embed_dim: args.embed_dim,
        positions: config.max_length,
    };
    let (model, tokenizer) = load_collaborators(&args.weights, &args.vocab, dims);
    // a server without a model still answers /status
    let bot = match Catbot::new(model, tokenizer, config) {
        Ok(b) => Arc::new(b),
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(ready = bot.is_ready(), "catbot initialised");

    let server = match Server::http(&args.addr) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(addr = %args.addr, error = %e, "failed to bind server");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(addr = %args.addr, "server running");

    for request in server.incoming_requests() {
        let bot = Arc::clone(&bot);
        thread::spawn(move || handle(&bot, request));
    }
    ExitCode::SUCCESS
}
