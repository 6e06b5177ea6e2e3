//! Interactive reviewer console
//!
//! A small rustyline loop over the /hitl endpoints: list the pending
//! queue, inspect a request, then approve, reject or modify it.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::api_client::ApiClient;
use crate::display;

const HELP: &str = "\
commands:
  list                      pending requests, most urgent first
  show <id>                 full details of one request
  approve <id> [feedback]   approve the request
  reject <id> [feedback]    reject the request
  modify <id> <json>        approve with replacement fields, e.g.
                            modify abc {\"response\": \"edited text\"}
  stats                     approval statistics
  help                      this text
  exit                      leave the console";

pub async fn run(client: &ApiClient, reviewer: &str) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("Reviewer console ({reviewer}). Type 'help' for commands.");

    loop {
        let line = match rl.readline("review> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line);

        if let Err(e) = dispatch(client, reviewer, line).await {
            eprintln!("error: {e}");
        }
        if line == "exit" || line == "quit" {
            break;
        }
    }

    Ok(())
}

async fn dispatch(client: &ApiClient, reviewer: &str, line: &str) -> Result<()> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "list" => {
            let pending = client.pending().await?;
            if pending.count == 0 {
                println!("queue is empty");
            }
            for request in &pending.requests {
                display::print_request_summary(request);
            }
        }
        "show" => {
            let request = client.request(rest).await?;
            display::print_request_details(&request);
        }
        "approve" | "reject" => {
            let (id, feedback) = split_id(rest)?;
            let result = if command == "approve" {
                client.approve(id, reviewer, feedback).await?
            } else {
                client.reject(id, reviewer, feedback).await?
            };
            println!("{} {}", result.decision, result.request_id);
        }
        "modify" => {
            let (id, payload) = split_id(rest)?;
            let payload =
                payload.ok_or_else(|| anyhow::anyhow!("modify needs a JSON object"))?;
            let modified_data: serde_json::Value = serde_json::from_str(&payload)?;
            let result = client.modify(id, reviewer, None, modified_data).await?;
            println!("{} {}", result.decision, result.request_id);
        }
        "stats" => {
            let stats = client.statistics().await?;
            display::print_statistics(&stats);
        }
        "help" => println!("{HELP}"),
        "exit" | "quit" => {}
        other => println!("unknown command '{other}', type 'help'"),
    }

    Ok(())
}

/// Split "<id> [trailing text]" into the id and the optional remainder.
fn split_id(rest: &str) -> Result<(&str, Option<String>)> {
    if rest.is_empty() {
        anyhow::bail!("missing request id");
    }
    match rest.split_once(char::is_whitespace) {
        Some((id, trailing)) => Ok((id, Some(trailing.trim().to_string()))),
        None => Ok((rest, None)),
    }
}
