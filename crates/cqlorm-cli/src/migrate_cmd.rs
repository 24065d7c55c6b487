use crate::cli::MigrateArgs;
use anyhow::Context;
use cqlorm::{Migrator, SessionConfig, connect_logged};

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let mut migrator = Migrator::new();
    for file in &args.files {
        migrator = migrator
            .add_file(file)
            .with_context(|| format!("failed to load {}", file.display()))?;
    }

    if migrator.is_empty() {
        println!("no statements found");
        return Ok(());
    }

    if args.dry_run {
        for (i, cql) in migrator.statements().iter().enumerate() {
            println!("-- statement {}\n{cql};\n", i + 1);
        }
        println!("{} statement(s), dry run", migrator.len());
        return Ok(());
    }

    let config = SessionConfig::from_file(&args.config)?;
    let session = connect_logged(&config)
        .await
        .with_context(|| format!("failed to connect to {}", config.hosts.join(", ")))?;

    let report = migrator.run(&session).await?;
    tracing::info!(target: "cqlorm.migrate", applied = report.applied, "migrations complete");
    println!("applied {} statement(s)", report.applied);
    Ok(())
}
