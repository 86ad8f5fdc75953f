use std::sync::Arc;

use anyhow::{Context, Result};
use arbolitos_clones::db::{self, MongoActivityLog, MongoPlantRepository, MongoZoneDirectory};
use arbolitos_clones::models::{Plant, PlantSummary};
use arbolitos_clones::plants::{self, NewPlant, PlantChanges};
use arbolitos_clones::propagation::{CloneSpec, Propagator};
use arbolitos_clones::repository::PlantRepository;
use arbolitos_clones::Config;
use clap::Parser;
use tracing_subscriber::EnvFilter;
mod cli;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("arbolitos_clones=debug,arbolitos=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().context("configuración inválida")?;

    // Connect to MongoDB:
    let db = db::connect(&config.mongo_uri, &config.db_name)
        .await
        .context("Error al conectar con MongoDB")?;

    let plants: Arc<dyn PlantRepository> = Arc::new(MongoPlantRepository::new(&db));
    let propagator = Propagator::new(
        plants.clone(),
        Arc::new(MongoActivityLog::new(&db)),
        Arc::new(MongoZoneDirectory::new(&db)),
        config.propagation.clone(),
    );

    match cli.command {
        Commands::View { id, status, ids } => {
            let found: Vec<Plant> = match (id, status) {
                (Some(id), _) => plants.find_by_id(id).await?.into_iter().collect(),
                (None, Some(status)) => plants.find_by_status_in(&[status]).await?,
                (None, None) => plants.list_all().await?,
            };

            if found.is_empty() {
                println!("No se encontraron plantas");
            }
            for plant in &found {
                if ids {
                    println!("{}, '{}'", plant.id, plant.name);
                    continue;
                }
                println!(
                    "Name: '{}'\nEstado: {}\nDescripción: {}\nEsqueje de: {}\nInicio: {}\nID: '{}',",
                    plant.name,
                    plant.status,
                    plant.description,
                    plant
                        .parent_id()
                        .map_or_else(|| "-".to_string(), |p| p.to_hex()),
                    plant.start_date.to_rfc3339(),
                    plant.id,
                );
                if plant.updates.is_empty() {
                    println!("Updates: Ninguno")
                } else {
                    for (i, update) in plant.updates.iter().enumerate() {
                        println!(
                            "  Update {}:\n    Fecha: {}\n    Altura: {} cm\n    Imagen: {}\n    Comentario: '{}'",
                            i + 1,
                            update.date.to_rfc3339(),
                            update.height_cm,
                            update.image_url,
                            update.comment
                        );
                    }
                }
                println!();
            }
        }
        Commands::Add(args) => {
            let new = NewPlant {
                name: args.name,
                description: args.description,
                status: args.status,
                strain_id: args.strain,
                zone_id: args.zone,
            };
            let inserted_id = plants::add_plant(plants.as_ref(), new).await?;
            println!("Planta agregada, ID: {}", inserted_id);
        }
        Commands::Update(args) => {
            let changes = PlantChanges {
                name: args.name,
                status: args.status,
                height_cm: args.height_cm,
                image_url: args.image_url,
                comment: args.comment,
            };
            if changes.is_empty() {
                println!("No se proporcionaron cambios para actualizar");
            } else {
                plants::update_plant(plants.as_ref(), args.id, changes).await?;
                println!("Planta ID {} actualizada", args.id);
            }
        }
        Commands::Remove { id } => {
            plants::remove_plant(plants.as_ref(), id).await?;
            println!("Planta con ID: {} removida.", id);
        }
        Commands::Eligible => {
            let eligible = propagator.list_eligible_parents().await?;
            if eligible.is_empty() {
                println!("No hay plantas vivas para sacar esquejes");
            }
            for plant in &eligible {
                print_summary("", plant);
            }
        }
        Commands::Clone(args) => {
            let specs = args
                .names
                .into_iter()
                .map(|name| CloneSpec {
                    name,
                    description: args.description.clone(),
                    zone_id: args.zone,
                    start_date: None,
                })
                .collect();
            let result = propagator
                .create_clones(args.parent, specs, &args.user)
                .await?;

            println!(
                "Esquejes creados: {}, fallidos: {}",
                result.created.len(),
                result.failed.len()
            );
            for created in &result.created {
                println!("  + '{}' -> {}", created.spec.name, created.plant_id);
            }
            for failed in &result.failed {
                println!("  - '{}': {}", failed.spec.name, failed.error);
            }
        }
        Commands::Lineage { id } => {
            let lineage = propagator.get_lineage(id).await?;
            print_summary("Planta: ", &lineage.plant);
            match &lineage.parent {
                Some(parent) => print_summary("Madre: ", parent),
                None => println!("Madre: Ninguna"),
            }
            match &lineage.grandparent {
                Some(grandparent) => print_summary("Abuela: ", grandparent),
                None => println!("Abuela: Ninguna"),
            }
            println!("Hermanas: {}", lineage.siblings.len());
            for sibling in &lineage.siblings {
                print_summary("  ", sibling);
            }
            println!("Hijas: {}", lineage.children.len());
            for child in &lineage.children {
                print_summary("  ", child);
            }
        }
        Commands::Stats => {
            let stats = propagator.get_clone_statistics().await?;
            println!(
                "Intentos: {}\nExitosos: {}\nFallidos: {}\nTasa de éxito: {:.1}%",
                stats.total,
                stats.successful,
                stats.failed,
                stats.success_rate * 100.0
            );
            for (i, top) in stats.top_parents.iter().enumerate() {
                println!("  {}. {} ({} esquejes)", i + 1, top.plant_id, top.count);
            }
        }
        Commands::RemoveClone { id, user } => {
            let removal = propagator.delete_clone(id, &user).await?;
            println!("Esqueje con ID: {} removido.", removal.clone_id);
            if removal.reparented > 0 {
                println!(
                    "{} esquejes pasaron a la planta {}",
                    removal.reparented, removal.parent_id
                );
            }
        }
    }

    Ok(())
}

fn print_summary(prefix: &str, plant: &PlantSummary) {
    println!("{}{}, '{}' ({})", prefix, plant.id, plant.name, plant.status);
}
