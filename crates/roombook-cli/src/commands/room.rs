use clap::Subcommand;
use roombook_core::{Repository, Room, RoomInsert, RoomUpdate};

use super::{backend, print_json, CmdResult};

#[derive(Subcommand)]
pub enum RoomAction {
    /// List rooms
    List,
    /// Add a room
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        capacity: u32,
        /// Capability tag (repeatable), e.g. --feature projector
        #[arg(long = "feature")]
        features: Vec<String>,
    },
    /// Update fields of a room
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        capacity: Option<u32>,
        /// Replaces the feature list (repeatable)
        #[arg(long = "feature")]
        features: Vec<String>,
    },
    /// Remove a room and its bookings
    Remove { id: i64 },
}

pub async fn run(action: RoomAction) -> CmdResult {
    let backend = backend()?;
    let rooms = Repository::<Room>::new(backend.as_ref());

    match action {
        RoomAction::List => print_json(&rooms.list().await?)?,
        RoomAction::Add {
            name,
            capacity,
            features,
        } => {
            let insert = RoomInsert {
                name,
                capacity,
                features,
            };
            insert.validate()?;
            print_json(&rooms.insert(&insert).await?)?;
        }
        RoomAction::Update {
            id,
            name,
            capacity,
            features,
        } => {
            let patch = RoomUpdate {
                name,
                capacity,
                features: (!features.is_empty()).then_some(features),
            };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            patch.validate()?;
            print_json(&rooms.update(id, &patch).await?)?;
        }
        RoomAction::Remove { id } => {
            rooms.delete(id).await?;
            println!("removed room {id}");
        }
    }
    Ok(())
}
