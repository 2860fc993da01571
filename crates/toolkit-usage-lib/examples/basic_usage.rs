use std::env;
use std::sync::Arc;
use toolkit_usage_ledger::prelude::*;
use toolkit_usage_ledger::{LedgerConfig, UsageStore};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Sign in when a user id was provided, otherwise stay anonymous
    let mut session = if args.len() >= 2 {
        let data_dir = LedgerConfig::resolve_data_dir(None);
        let config = LedgerConfig::load(&data_dir)?;
        println!("Signing in as {} (data in {})", args[1], data_dir.display());
        Session::sign_in(
            config.catalog(),
            clock,
            UsageStore::new(&data_dir),
            &args[1],
            None,
            config.default_tier,
        )?
    } else {
        println!("Running as an anonymous guest; usage will not be saved");
        Session::anonymous(ToolCatalog::new(), clock)
    };

    println!("\n--- Account ---");
    println!("Name: {}", session.name());
    println!("Plan: {}", session.tier().description());
    println!("Member since: {}", session.join_date());

    let tool_id = "hash-generator";
    let limit = session.catalog().daily_limit(tool_id).unwrap_or(0);

    println!("\n--- Using {} ---", tool_id);
    for attempt in 1..=3 {
        match session.run_tool(tool_id, None, |variant| Ok(format!("ran {}", variant))) {
            Ok(output) => println!(
                "#{}: {} ({} left today)",
                attempt,
                output,
                session.get_remaining_usage(tool_id, limit)
            ),
            Err(e) if e.wants_upgrade() => {
                println!("#{}: {} - upgrade to Pro for unlimited use", attempt, e);
                break;
            }
            Err(e) => println!("#{}: {}", attempt, e),
        }
    }

    let rejected: std::result::Result<(), ToolError> = session.run_tool("json-formatter", None, |_| {
        Err(ToolError::InvalidInput("expected value at line 1 column 1".to_string()))
    });
    if let Err(e) = rejected {
        println!("Rejected input costs nothing: {}", e);
    }

    println!("\n--- Today ---");
    for tool in session.catalog().tools() {
        let remaining = session.get_remaining_usage(tool.id(), tool.daily_limit());
        println!(
            "{:<16} used {:>3} / {:<3} remaining {}",
            tool.id(),
            session.usage_today(tool.id()),
            tool.daily_limit(),
            remaining
        );
    }

    let monthly = session.usage_this_month();
    println!(
        "\nThis month: {} uses across {} tools",
        monthly.total_uses(),
        monthly.distinct_tools()
    );
    let reset = session.time_until_reset();
    println!(
        "Daily limits reset in {}h {}m (UTC midnight)",
        reset.num_hours(),
        reset.num_minutes() % 60
    );

    Ok(())
}
