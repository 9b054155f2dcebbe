//! Built-in event table.
//!
//! Entries are ordered oldest to newest; the last entry is the default event.

use chrono::NaiveDate;

use super::{EventConfig, SchemaKind};

/// `(name, schema, base_url, (year, month, day))`, ordered by start date.
const BUILTIN_EVENTS: &[(&str, SchemaKind, &str, (i32, u32, u32))] = &[
    (
        "camp2015",
        SchemaKind::Legacy,
        "https://events.ccc.de/camp/2015/Fahrplan",
        (2015, 8, 13),
    ),
    (
        "32c3",
        SchemaKind::Legacy,
        "https://events.ccc.de/congress/2015/Fahrplan",
        (2015, 12, 26),
    ),
    (
        "33c3",
        SchemaKind::Legacy,
        "https://fahrplan.events.ccc.de/congress/2016/Fahrplan",
        (2016, 12, 27),
    ),
    (
        "mrmcd2017",
        SchemaKind::Api,
        "https://cfp.mrmcd.net/2017",
        (2017, 9, 1),
    ),
    (
        "34c3",
        SchemaKind::Legacy,
        "https://fahrplan.events.ccc.de/congress/2017/Fahrplan",
        (2017, 12, 27),
    ),
    (
        "mrmcd2018",
        SchemaKind::Api,
        "https://talks.mrmcd.net/2018",
        (2018, 9, 7),
    ),
    (
        "35c3",
        SchemaKind::Legacy,
        "https://fahrplan.events.ccc.de/congress/2018/Fahrplan",
        (2018, 12, 27),
    ),
    (
        "camp2019",
        SchemaKind::Legacy,
        "https://events.ccc.de/camp/2019/Fahrplan",
        (2019, 8, 21),
    ),
    (
        "36c3",
        SchemaKind::Legacy,
        "https://fahrplan.events.ccc.de/congress/2019/Fahrplan",
        (2019, 12, 27),
    ),
    (
        "37c3",
        SchemaKind::Api,
        "https://fahrplan.events.ccc.de/congress/2023/fahrplan",
        (2023, 12, 27),
    ),
    (
        "38c3",
        SchemaKind::Api,
        "https://fahrplan.events.ccc.de/congress/2024/fahrplan",
        (2024, 12, 27),
    ),
];

/// Returns the built-in events in registry order.
#[must_use]
pub(crate) fn builtin_events() -> Vec<EventConfig> {
    BUILTIN_EVENTS
        .iter()
        .map(|&(name, schema, base_url, (year, month, day))| EventConfig {
            name: name.to_string(),
            schema,
            base_url: base_url.to_string(),
            starts: NaiveDate::from_ymd_opt(year, month, day),
        })
        .collect()
}
