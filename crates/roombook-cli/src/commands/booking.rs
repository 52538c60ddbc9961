use clap::Subcommand;
use roombook_core::{Booking, BookingInsert, BookingType, BookingUpdate, Repository};

use super::{backend, print_json, CmdResult};

#[derive(Subcommand)]
pub enum BookingAction {
    /// List bookings, optionally for one room and date
    List {
        #[arg(long)]
        room: Option<i64>,
        /// YYYY-MM-DD (requires --room)
        #[arg(long, requires = "room")]
        date: Option<String>,
    },
    /// Book a room
    Add {
        #[arg(long)]
        room: i64,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        start: String,
        /// HH:MM
        #[arg(long)]
        end: String,
        #[arg(long)]
        booker: String,
        #[arg(long)]
        purpose: Option<String>,
        /// meeting, presentation, workshop, internal or external
        #[arg(long = "type")]
        booking_type: Option<BookingType>,
        /// Mark as a quick (ad-hoc) booking
        #[arg(long)]
        quick: bool,
    },
    /// Update fields of a booking
    Update {
        id: i64,
        #[arg(long)]
        room: Option<i64>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        booker: Option<String>,
        #[arg(long)]
        purpose: Option<String>,
        #[arg(long = "type")]
        booking_type: Option<BookingType>,
    },
    /// Remove a booking
    Remove { id: i64 },
}

pub async fn run(action: BookingAction) -> CmdResult {
    let backend = backend()?;
    let bookings = Repository::<Booking>::new(backend.as_ref());

    match action {
        BookingAction::List { room, date } => {
            let list = match room {
                Some(room_id) => bookings.for_room(room_id, date.as_deref()).await?,
                None => bookings.list().await?,
            };
            print_json(&list)?;
        }
        BookingAction::Add {
            room,
            date,
            start,
            end,
            booker,
            purpose,
            booking_type,
            quick,
        } => {
            let insert = BookingInsert {
                room_id: room,
                date,
                start_time: start,
                end_time: end,
                booker,
                purpose,
                booking_type,
                is_quick_booking: quick.then_some(true),
            };
            insert.validate()?;
            print_json(&bookings.insert(&insert).await?)?;
        }
        BookingAction::Update {
            id,
            room,
            date,
            start,
            end,
            booker,
            purpose,
            booking_type,
        } => {
            let patch = BookingUpdate {
                room_id: room,
                date,
                start_time: start,
                end_time: end,
                booker,
                purpose,
                booking_type,
                is_quick_booking: None,
            };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            // Check the slot the patch would produce before writing it.
            bookings.get(id).await?.patched(&patch).validate()?;
            print_json(&bookings.update(id, &patch).await?)?;
        }
        BookingAction::Remove { id } => {
            bookings.delete(id).await?;
            println!("removed booking {id}");
        }
    }
    Ok(())
}
