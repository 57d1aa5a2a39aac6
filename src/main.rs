use clap::Parser;
use j60adm::config::cli::{Cli, Command, ImportKind};
use j60adm::core::addresses::{campaign_overview, synchronize_addresses};
use j60adm::domain::model::sort_titles;
use j60adm::domain::notation;
use j60adm::utils::logger;
use j60adm::{
    AddressBookImport, AssociationConfig, Import, JsonStore, RecordStore, RegistrationImport,
    SurveyResponseImport,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let config = match &cli.config {
        Some(path) => AssociationConfig::from_file(path)?,
        None => AssociationConfig::default(),
    };
    config.validate()?;
    if cli.verbose {
        tracing::debug!("association config: {:?}", config);
    }

    let store = JsonStore::open(&cli.store).await?;

    match cli.command {
        Command::Import { kind } => {
            let (label, file) = match &kind {
                ImportKind::Registrations { file } => ("registrations", file),
                ImportKind::SurveyResponses { file } => ("survey responses", file),
                ImportKind::Addresses { file } => ("addresses", file),
            };
            let input = tokio::fs::read_to_string(file).await?;
            let summary = match kind {
                ImportKind::Registrations { .. } => {
                    RegistrationImport::new(&store, config).run(&input).await?
                }
                ImportKind::SurveyResponses { .. } => {
                    SurveyResponseImport::new(&store, config).run(&input).await?
                }
                ImportKind::Addresses { .. } => {
                    AddressBookImport::new(&store, config).run(&input).await?
                }
            };
            println!(
                "Imported {}: {} created, {} updated",
                label, summary.created, summary.updated
            );
        }
        Command::SyncAddresses => {
            let created = synchronize_addresses(&store).await?;
            println!("Created {created} email addresses");
        }
        Command::Campaign => {
            for row in campaign_overview(&store).await? {
                println!("{}\t{}\t{}", row.person_name, row.address, row.state);
            }
        }
        Command::Persons => {
            let persons = store.persons().await?;
            let titles = store.titles().await?;

            let mut listed: Vec<_> = persons
                .into_iter()
                .map(|person| {
                    let mut held: Vec<_> = titles
                        .iter()
                        .filter(|t| t.person_id == person.id)
                        .cloned()
                        .collect();
                    sort_titles(&mut held);
                    let key = notation::title_order_key(&person.name, &held);
                    let newest = held
                        .first()
                        .map(|t| notation::format_title(t, config.current_period))
                        .unwrap_or_default();
                    (key, person.name, newest)
                })
                .collect();
            listed.sort();
            for (_, name, newest) in listed {
                println!("{newest}\t{name}");
            }
        }
    }

    Ok(())
}
