use chrono::NaiveTime;
use serde::Deserialize;

const TIME_OF_DAY_FORMAT: &str = "%H:%M";

pub fn serialize_time_of_day<S: serde::ser::Serializer>(
    time: &NaiveTime,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.serialize_str(&time.format(TIME_OF_DAY_FORMAT).to_string())
}

pub fn deserialize_time_of_day<'de, D: serde::de::Deserializer<'de>>(
    d: D,
) -> Result<NaiveTime, D::Error> {
    let value = String::deserialize(d)?;

    NaiveTime::parse_from_str(&value, TIME_OF_DAY_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(&value, "%H:%M:%S"))
        .map_err(serde::de::Error::custom)
}
