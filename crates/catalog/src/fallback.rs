//! Event snapshot bundled with the service.
//!
//! Served whenever the primary store cannot be used. The entries are fixed
//! data; edit them here and bump [`SNAPSHOT_VERSION`].

use std::collections::HashSet;

use chrono::NaiveDate;
use shared::{
    domain::{EventId, EventRecord},
    error::ServiceError,
};
use tracing::error;

pub const SNAPSHOT_VERSION: &str = "2025.1";

struct SnapshotEntry {
    id: &'static str,
    name: &'static str,
    date: &'static str,
    description: &'static str,
}

const SNAPSHOT: &[SnapshotEntry] = &[
    SnapshotEntry {
        id: "1",
        name: "Holi",
        date: "2025-03-14",
        description: "Holi is a major Hindu festival celebrated as the Festival of Colours, Love and Spring. It celebrates the eternal and divine love of the deities Radha and Krishna.",
    },
    SnapshotEntry {
        id: "2",
        name: "Navratri",
        date: "2025-09-26",
        description: "Navaratri is an annual Hindu festival observed in honor of the goddess Durga, an aspect of Adi Parashakti, the supreme goddess. It spans over nine nights, first in the month of Chaitra, and again in the month of Ashvin.",
    },
    SnapshotEntry {
        id: "3",
        name: "Diwali",
        date: "2025-10-20",
        description: "Diwali, also called Deepavali or Deepawali, is the Hindu festival of lights, with variations celebrated in other Indian religions such as Jainism and Sikhism. It symbolises the spiritual victory of Dharma over Adharma, light over darkness, good over evil, and knowledge over ignorance.",
    },
    SnapshotEntry {
        id: "4",
        name: "Chhath Puja",
        date: "2025-10-25",
        description: "Chhath is an ancient Hindu festival, native to eastern India and southern Nepal. It is celebrated especially in the Indian states of Bihar, Jharkhand, and Eastern Uttar Pradesh; and Koshi, Gandaki, Bagmati, Lumbini and Madhesh provinces of Nepal.",
    },
    SnapshotEntry {
        id: "5",
        name: "Raja Sankranti",
        date: "2025-07-16",
        description: "Raja is a quintessential festival of Odisha celebrated each year during the Odia month of Asadha (2nd week of June). Unique in many aspects, Raja is counted as one of the major agrarian festivals of the state.",
    },
    SnapshotEntry {
        id: "6",
        name: "Guru Nanak Gurpurab",
        date: "2025-11-05",
        description: "Guru Nanak Gurpurab is the celebration of the birth of Guru Nanak, the founder of Sikhism. It is observed with great fervor by Sikhs around the world.",
    },
    SnapshotEntry {
        id: "7",
        name: "Eid al-Fitr",
        date: "2025-04-10",
        description: "Eid al-Fitr is the first of the two main festivals in Islam, the other being Eid al-Adha. It falls on the first day of Shawwal, the tenth month of the Islamic calendar. Eid al-Fitr is celebrated by Muslims worldwide as it marks the end of the month-long, dawn-to-dusk fasting during Ramadan.",
    },
    SnapshotEntry {
        id: "8",
        name: "Christmas",
        date: "2025-12-25",
        description: "Christmas is an annual festival commemorating the birth of Jesus Christ, observed primarily on December 25 as a religious and cultural celebration among billions of people around the world.",
    },
    SnapshotEntry {
        id: "9",
        name: "Raksha Bandhan",
        date: "2025-08-19",
        description: "Raksha Bandhan is a Hindu festival celebrating the bond between brothers and sisters. On this day, sisters tie a protective thread (rakhi) around their brothers' wrists, and brothers give gifts in return.",
    },
    SnapshotEntry {
        id: "10",
        name: "Bihu",
        date: "2025-04-14",
        description: "Bihu is a set of three important Assamese festivals celebrated in the Indian state of Assam. The festivals are Rongali Bihu, Kongali Bihu, and Bhogali Bihu, each marking different phases of the agricultural calendar.",
    },
    SnapshotEntry {
        id: "11",
        name: "Janmashtami",
        date: "2025-09-06",
        description: "Janmashtami is a Hindu festival celebrating the birth of Lord Krishna, observed on the eighth day of the dark fortnight in the month of Bhadrapada.",
    },
    SnapshotEntry {
        id: "12",
        name: "Baisakhi",
        date: "2025-04-13",
        description: "Baisakhi is a harvest festival celebrated in the Punjab region of India, marking the beginning of the new harvest season. It is also observed as the Punjabi New Year.",
    },
    SnapshotEntry {
        id: "13",
        name: "Nukahai",
        date: "2025-12-25",
        description: "Nukahai is a festival celebrated in the Indian state of Odisha, marking the end of the harvest season. It is a time for feasting and giving thanks for the bounty of the earth.",
    },
    SnapshotEntry {
        id: "14",
        name: "Lohri",
        date: "2025-01-13",
        description: "Lohri is a popular Punjabi festival celebrated primarily in the northern regions of India. It marks the end of winter and the beginning of the harvest season, and is celebrated with bonfires, dancing, and traditional foods.",
    },
];

/// Number of entries checked into the snapshot.
pub fn snapshot_len() -> usize {
    SNAPSHOT.len()
}

/// The snapshot as event records, ascending by date in definition order.
pub fn snapshot() -> Vec<EventRecord> {
    let mut events: Vec<EventRecord> = SNAPSHOT
        .iter()
        .filter_map(|entry| match entry.date.parse::<NaiveDate>() {
            Ok(date) => Some(EventRecord {
                id: EventId::from(entry.id),
                name: entry.name.to_string(),
                description: entry.description.to_string(),
                date,
            }),
            Err(error) => {
                error!(id = entry.id, date = entry.date, %error, "bundled event has an invalid date");
                None
            }
        })
        .collect();
    events.sort_by_key(|event| event.date);
    events
}

/// Checks that every bundled entry is servable.
pub fn verify() -> Result<usize, ServiceError> {
    let events = snapshot();
    if events.is_empty() || events.len() != SNAPSHOT.len() {
        return Err(ServiceError::AllTiersExhausted(format!(
            "fallback snapshot {SNAPSHOT_VERSION} yields {} of {} events",
            events.len(),
            SNAPSHOT.len()
        )));
    }
    if events.iter().any(|event| event.name.trim().is_empty()) {
        return Err(ServiceError::AllTiersExhausted(format!(
            "fallback snapshot {SNAPSHOT_VERSION} contains an unnamed event"
        )));
    }
    let mut seen = HashSet::new();
    if let Some(duplicate) = events.iter().find(|event| !seen.insert(&event.id)) {
        return Err(ServiceError::AllTiersExhausted(format!(
            "fallback snapshot {SNAPSHOT_VERSION} repeats id {}",
            duplicate.id
        )));
    }
    Ok(events.len())
}
