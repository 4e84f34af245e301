use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blood_finder::catalog::Catalog;
use blood_finder::config::Config;
use blood_finder::criteria::SearchSession;
use blood_finder::parser::CriteriaExtractor;
use blood_finder::pipeline::Pipeline;
use blood_finder::search::SearchEngine;
use blood_finder::server::BloodFinderServer;
use blood_finder::voice::{self, TracingSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting blood-finder MCP server");

    let config = Config::from_env()?;
    info!(
        catalog = ?config.catalog_path,
        notable_stock = config.notable_stock,
        ordering = ?config.ordering,
        gazetteer = config.location_gazetteer,
        "configuration loaded"
    );

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => {
            let catalog = Catalog::sample()?;
            info!(hospitals = catalog.len(), "using bundled sample catalog");
            catalog
        }
    };

    let extractor = if config.location_gazetteer {
        CriteriaExtractor::new().with_gazetteer(catalog.locations())
    } else {
        CriteriaExtractor::new()
    };
    info!(
        gazetteer = extractor.has_gazetteer(),
        "criteria extractor ready"
    );
    let pipeline = Arc::new(Pipeline::new(
        extractor,
        SearchEngine::new(catalog),
        config.notable_stock,
    ));

    if config.console {
        return run_console(&pipeline, &config).await;
    }

    let server = BloodFinderServer::new(Arc::clone(&pipeline), config.ordering);

    if let Some(addr) = &config.tcp_listen_addr {
        let listener = TcpListener::bind(addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.for_new_session();
            tokio::spawn(async move {
                info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}

/// Treat each stdin line as a recognized utterance. A blank line cancels
/// the listen, as pressing "stop" would.
async fn run_console(pipeline: &Pipeline, config: &Config) -> anyhow::Result<()> {
    info!("console mode: one transcript per line, blank line cancels");
    let sink = TracingSink;
    let mut session = SearchSession::new(config.ordering);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let (sender, receiver) = voice::start_listening(&mut session, &sink);
        if line.trim().is_empty() {
            sender.cancel();
        } else {
            sender.deliver(line);
        }
        if let Some(outcome) =
            voice::await_transcript(&mut session, pipeline, receiver, &sink).await
        {
            println!("{}", outcome.search.utterance);
            for hospital in &outcome.search.report.hospitals {
                println!("  [{}] {} ({})", hospital.id, hospital.name, hospital.location);
            }
        }
    }
    Ok(())
}
