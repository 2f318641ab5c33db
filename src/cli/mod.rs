pub mod commands;

use crate::cli::commands::{Commands, UsageAction, UserAction};
use crate::config::AppConfig;
use crate::db::{get_connection, models::PlanTier, service::UsageService};
use crate::tools::ToolRegistry;

pub async fn run_cli(command: Commands, config_path: String) {
    let config = AppConfig::load(&config_path).expect("Failed to load config");

    match command {
        Commands::Serve => {
            panic!("Serve command should be intercepted by main.rs to boot actix-web");
        }
        Commands::Tools => {
            let registry = ToolRegistry::new(&config.tools);

            for descriptor in registry.descriptors() {
                println!("{}", descriptor.name);
                println!("  {}", descriptor.description);
                println!(
                    "  parameters: {}",
                    serde_json::to_string(&descriptor.parameters).unwrap_or_default()
                );
            }
        }
        Commands::Usage { action } => {
            let pool = get_connection(&config.database).expect("DB error");
            let conn = pool.lock().unwrap();

            match action {
                UsageAction::Show { user_id } => {
                    match UsageService::check_limit(&conn, &user_id, &config.limits) {
                        Ok(status) => {
                            println!("User:      {} ({})", status.user_id, status.plan.as_str());
                            println!("Day:       {}", status.day);
                            if status.limit < 0 {
                                println!("Requests:  {} (unlimited plan)", status.count);
                            } else {
                                println!(
                                    "Requests:  {} / {} ({} remaining)",
                                    status.count, status.limit, status.remaining
                                );
                            }
                        }
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                UsageAction::Reset { user_id } => {
                    match UsageService::reset_today(&conn, &user_id) {
                        Ok(_) => println!("Reset today's usage for {}", user_id),
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
            }
        }
        Commands::User { action } => {
            let pool = get_connection(&config.database).expect("DB error");
            let conn = pool.lock().unwrap();

            match action {
                UserAction::SetPlan { user_id, plan } => {
                    let tier = PlanTier::from_name(&plan);
                    match UsageService::set_plan(&conn, &user_id, tier) {
                        Ok(_) => println!("Set plan for {} to {}", user_id, tier.as_str()),
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
            }
        }
    }
}
