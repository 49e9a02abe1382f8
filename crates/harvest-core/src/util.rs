/// Serde adapter for optional instants stored as BSON datetimes.
///
/// `None` serializes as BSON `null`, which keeps "never happened" queryable
/// with a plain equality filter and also matches documents missing the field.
pub mod optional_bson_datetime {
    use bson::DateTime as BsonDateTime;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(instant) => BsonDateTime::from_chrono(*instant).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<BsonDateTime>::deserialize(deserializer)?;
        Ok(value.map(BsonDateTime::to_chrono))
    }
}
