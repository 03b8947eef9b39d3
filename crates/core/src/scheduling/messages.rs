//! Caller-facing outcomes of a scheduling flow and their French wording.

use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;
use rendezvous_domain::utils::format::format_numbered_slots;
use rendezvous_domain::{format_slot, RendezvousError};

/// What a flow tells the caller. `Display` renders the spoken sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingReply {
    /// The requested time could not be understood.
    Clarify,
    /// The slot starting at `slot` is taken or could not be confirmed free.
    SlotUnavailable { slot: DateTime<Tz> },
    /// A new appointment now holds the slot starting at `slot`.
    Booked { slot: DateTime<Tz> },
    /// The appointment was moved; `slot` is its new start.
    Rescheduled { slot: DateTime<Tz> },
    /// The appointment that started at `slot` was deleted.
    Cancelled { slot: DateTime<Tz> },
    /// No upcoming appointment to move.
    NothingToReschedule,
    /// No upcoming appointment to cancel.
    NothingToCancel,
    /// Several upcoming appointments; the caller has to pick one.
    ChooseAppointment { candidates: Vec<DateTime<Tz>> },
    /// The appointment disappeared from the calendar mid-flow.
    AppointmentMissing,
    /// The calendar refused access.
    NotPermitted,
    /// The calendar failed or could not be reached; the caller may retry.
    TemporaryFailure,
}

impl SchedulingReply {
    /// Reply for a failed calendar operation. `slot` is the start the caller
    /// asked for, when there is one.
    pub fn for_failure(error: &RendezvousError, slot: Option<DateTime<Tz>>) -> Self {
        match (error, slot) {
            (RendezvousError::SlotConflict(_), Some(slot)) => Self::SlotUnavailable { slot },
            (RendezvousError::NotFound(_), _) => Self::AppointmentMissing,
            (RendezvousError::PermissionDenied(_), _) => Self::NotPermitted,
            (RendezvousError::Parse(_) | RendezvousError::InvalidInput(_), _) => Self::Clarify,
            _ => Self::TemporaryFailure,
        }
    }

    /// Whether the requested change was applied at the backend.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Booked { .. } | Self::Rescheduled { .. } | Self::Cancelled { .. })
    }
}

impl fmt::Display for SchedulingReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clarify => f.write_str(
                "Je n'ai pas bien compris la date ou l'heure souhaitée. Pouvez-vous préciser, \
                 par exemple « demain à 14h30 » ou « 15/01/2024 à 10h » ?",
            ),
            Self::SlotUnavailable { slot } => write!(
                f,
                "Le créneau du {} n'est pas disponible. Souhaitez-vous choisir un autre horaire ?",
                format_slot(slot)
            ),
            Self::Booked { slot } => {
                write!(f, "Votre rendez-vous est confirmé pour le {}.", format_slot(slot))
            }
            Self::Rescheduled { slot } => {
                write!(f, "Votre rendez-vous a été déplacé au {}.", format_slot(slot))
            }
            Self::Cancelled { slot } => {
                write!(f, "Votre rendez-vous du {} a bien été annulé.", format_slot(slot))
            }
            Self::NothingToReschedule => {
                f.write_str("Je ne trouve aucun rendez-vous à venir à déplacer.")
            }
            Self::NothingToCancel => f.write_str("Je ne trouve aucun rendez-vous à venir à annuler."),
            Self::ChooseAppointment { candidates } => write!(
                f,
                "Vous avez plusieurs rendez-vous à venir : {}. Lequel souhaitez-vous annuler ?",
                format_numbered_slots(candidates)
            ),
            Self::AppointmentMissing => f.write_str(
                "Ce rendez-vous n'existe plus dans l'agenda, il a peut-être déjà été annulé.",
            ),
            Self::NotPermitted => f.write_str(
                "Je n'ai pas l'autorisation de modifier l'agenda de la clinique. \
                 Merci de contacter le secrétariat.",
            ),
            Self::TemporaryFailure => f.write_str(
                "Un problème technique m'empêche d'accéder à l'agenda. \
                 Pouvez-vous réessayer dans quelques instants ?",
            ),
        }
    }
}
