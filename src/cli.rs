use arbolitos_clones::models::PlantStatus;
use clap::{Args, Parser, Subcommand};
use mongodb::bson::oid::ObjectId;

#[derive(Parser)]
#[command(name = "arbolitos")]
#[command(about = "Una CLI para gestionar mis plantas, sus esquejes y su genealogía")]
pub struct Cli {
    /// Mostrar logs de depuración
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ver plantas (todas, por estado o por ID)
    View {
        /// ID de la planta (ObjectId)
        #[arg(long = "id", value_parser = parse_object_id)]
        id: Option<ObjectId>,
        /// Filtrar por estado
        #[arg(long = "status")]
        status: Option<PlantStatus>,

        #[arg(long = "ids")]
        ids: bool,
    },
    /// Agregar nueva planta (no esqueje)
    Add(AddArgs),
    /// Actualizar planta existente
    Update(UpdateArgs),
    /// Remover planta (para esquejes usar remove-clone)
    Remove {
        /// ID de la planta a remover (ObjectId)
        #[arg(long, value_parser = parse_object_id)]
        id: ObjectId,
    },
    /// Listar plantas que pueden dar esquejes
    Eligible,
    /// Sacar un lote de esquejes de una planta madre
    Clone(CloneArgs),
    /// Ver madre, abuela, hermanas e hijas de una planta
    Lineage {
        /// ID de la planta (ObjectId)
        #[arg(long, value_parser = parse_object_id)]
        id: ObjectId,
    },
    /// Estadísticas de propagación
    Stats,
    /// Remover un esqueje
    RemoveClone {
        /// ID del esqueje a remover (ObjectId)
        #[arg(long, value_parser = parse_object_id)]
        id: ObjectId,
        /// Usuario que realiza la acción
        #[arg(long, env = "ARBOLITOS_USER", default_value = "cli")]
        user: String,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Nombre de la planta
    #[arg(short = 'n', long = "name")]
    pub name: String,
    /// Descripción
    #[arg(short = 'd', long, default_value = "")]
    pub description: String,
    /// Estado inicial
    #[arg(short = 's', long)]
    pub status: Option<PlantStatus>,
    /// Variedad (ObjectId)
    #[arg(long, value_parser = parse_object_id)]
    pub strain: Option<ObjectId>,
    /// Zona (ObjectId)
    #[arg(long, value_parser = parse_object_id)]
    pub zone: Option<ObjectId>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// ID de la planta a actualizar (ObjectId)
    #[arg(long, value_parser = parse_object_id)]
    pub id: ObjectId,
    /// Nuevo nombre (opcional)
    #[arg(short, long)]
    pub name: Option<String>,
    /// Nuevo estado (opcional)
    #[arg(short, long)]
    pub status: Option<PlantStatus>,
    /// Nueva actualización: altura en cm (opcional)
    #[arg(long)]
    pub height_cm: Option<f32>,
    /// Nueva actualización: URL de imagen (opcional)
    #[arg(long)]
    pub image_url: Option<String>,
    /// Nueva actualización: comentario (opcional)
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Args, Debug)]
pub struct CloneArgs {
    /// ID de la planta madre (ObjectId)
    #[arg(long, value_parser = parse_object_id)]
    pub parent: ObjectId,
    /// Nombre de cada esqueje (repetir para varios)
    #[arg(short = 'n', long = "name", required = true)]
    pub names: Vec<String>,
    /// Descripción común para el lote
    #[arg(short = 'd', long)]
    pub description: Option<String>,
    /// Zona para todo el lote (ObjectId); por defecto la de la madre
    #[arg(long, value_parser = parse_object_id)]
    pub zone: Option<ObjectId>,
    /// Usuario que realiza la acción
    #[arg(long, env = "ARBOLITOS_USER", default_value = "cli")]
    pub user: String,
}

fn parse_object_id(raw: &str) -> Result<ObjectId, String> {
    ObjectId::parse_str(raw.trim()).map_err(|e| format!("ID inválido '{}': {}", raw, e))
}
