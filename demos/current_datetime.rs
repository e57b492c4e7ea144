//! Current date/time tool example
//!
//! Shows the descriptor an agent would see and the string the tool returns.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example current_datetime
//! ```

use agent_tools::prelude::*;
use std::collections::HashMap;

fn main() -> agent_tools::Result<()> {
    tracing_subscriber::fmt::init();

    let tool = CurrentDateTimeTool::new();

    let descriptor = tool.descriptor();
    println!("Tool: {}", descriptor.function.name);
    println!("  {}\n", descriptor.function.description);

    let result = tool.run(&HashMap::new())?;
    println!("{}\n", result.as_str().unwrap_or_default());

    println!("Structured snapshot:");
    println!("{}", serde_json::to_string_pretty(&tool.snapshot())?);

    Ok(())
}
