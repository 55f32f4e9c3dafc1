use migrate_api::MigrationRule;
use migrate_rules::ExampleRule;

use super::config::RulesArgs;
use super::error::MigrateBagError;

/// Вывести правила реестра или цепочку для `--from`/`--to`.
pub fn run(args: &RulesArgs) -> Result<(), MigrateBagError> {
    let registry = migrate_rules::registry()?;

    if args.from.is_none() && args.to.is_none() {
        println!("{} rule(s) registered:", registry.len());
        for rule in registry.iter() {
            println!("{}", describe(rule));
        }
        return Ok(());
    }

    let from = args.from.unwrap_or(0);
    let to = args.to.or(registry.latest()).unwrap_or(from);
    let chain = registry.select_chain(from, to)?;

    if chain.is_empty() {
        println!("v{from} -> v{to}: no migration needed");
        return Ok(());
    }

    println!("v{from} -> v{to}: {} rule(s)", chain.len());
    for rule in chain.rules() {
        println!("{}", describe(*rule));
    }
    Ok(())
}

fn describe(rule: &dyn MigrationRule) -> String {
    let about = ExampleRule::ALL
        .iter()
        .find(|r| r.version() == rule.version())
        .map(|r| r.describe())
        .unwrap_or("");
    format!("  v{:<3} {:<20} {about}", rule.version(), rule.name())
}
