// Beacon nodes return every integer as a decimal string, contract readers return native integers,
// and configuration files may contain either. This accepts both in human-readable formats.
//
// `serde_with::rust::display_fromstr` cannot be used because it calls `deserialize_str`, while
// `serde_yaml` and buffered `#[serde(flatten)]` content have already parsed values into numbers.
// Amounts in wei may exceed `u64`, so 128-bit integers are accepted as well.

use core::{
    fmt::{Display, Formatter, Result as FmtResult},
    marker::PhantomData,
    str::FromStr,
};

use serde::{
    de::{Error, IntoDeserializer as _, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Deserialize<'de> + FromStr<Err: Display>,
    D: Deserializer<'de>,
{
    struct AnyVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de> + FromStr<Err: Display>> Visitor<'de> for AnyVisitor<T> {
        type Value = T;

        fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
            formatter.write_str("a decimal string or a nonnegative integer")
        }

        fn visit_str<E: Error>(self, string: &str) -> Result<Self::Value, E> {
            string.parse().map_err(E::custom)
        }

        fn visit_u64<E: Error>(self, value: u64) -> Result<Self::Value, E> {
            T::deserialize(value.into_deserializer())
        }

        fn visit_u128<E: Error>(self, value: u128) -> Result<Self::Value, E> {
            T::deserialize(value.into_deserializer())
        }
    }

    if deserializer.is_human_readable() {
        deserializer.deserialize_any(AnyVisitor(PhantomData))
    } else {
        T::deserialize(deserializer)
    }
}

pub fn serialize<S: Serializer>(
    value: impl Serialize + Display,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    if serializer.is_human_readable() {
        serializer.collect_str(&value)
    } else {
        value.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(PartialEq, Eq, Debug, Deserialize, Serialize)]
    struct Amounts {
        #[serde(with = "crate::string_or_native")]
        epoch: u64,
        #[serde(with = "crate::string_or_native")]
        wei: u128,
    }

    #[test]
    fn quoted_and_native_integers_are_accepted() -> serde_json::Result<()> {
        let quoted = serde_json::from_value::<Amounts>(json!({
            "epoch": "3546",
            "wei": "340282366920938463463374607431768211455",
        }))?;

        let native = serde_json::from_value::<Amounts>(json!({ "epoch": 3546, "wei": 7 }))?;

        assert_eq!(quoted.epoch, 3546);
        assert_eq!(quoted.wei, u128::MAX);
        assert_eq!(native, Amounts { epoch: 3546, wei: 7 });

        Ok(())
    }

    #[test]
    fn integers_are_serialized_as_strings() -> serde_json::Result<()> {
        let json = serde_json::to_value(Amounts { epoch: 1, wei: 2 })?;

        assert_eq!(json, json!({ "epoch": "1", "wei": "2" }));

        Ok(())
    }

    #[test]
    fn negative_integers_are_rejected() {
        serde_json::from_value::<Amounts>(json!({ "epoch": -1, "wei": 0 }))
            .expect_err("epochs cannot be negative");
    }
}
