//! GraphQL scalars backed by domain types.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Adapter for the `#[graphql(with = ..)]` attribute, representing a scalar
/// as the string form of the domain type `D` it wraps.
///
/// The scalar is read through [`AsRef`] and built through [`TryFrom`] of `D`.
#[derive(Debug)]
pub struct Via<D>(PhantomData<D>);

impl<D> Via<D> {
    /// Renders the provided `scalar` as the [`fmt::Display`] of its `D`.
    pub fn to_output<T, S>(scalar: &T) -> Value<S>
    where
        D: fmt::Display,
        T: AsRef<D>,
        S: ScalarValue,
    {
        Value::scalar(scalar.as_ref().to_string())
    }

    /// Builds a scalar out of the string `input` holding a `D`.
    ///
    /// # Errors
    ///
    /// If the `input` is not a string or doesn't hold a valid `D`.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        D: FromStr,
        D::Err: fmt::Display,
        T: TryFrom<D> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let scalar = T::name(&()).unwrap_or("scalar");
        let Some(raw) = input.as_string_value() else {
            return Err(format!("`{scalar}` expects a string, found: {input}"));
        };
        raw.parse::<D>()
            .map_err(|e| format!("Invalid `{scalar}` \"{raw}\": {e}"))?
            .try_into()
            .map_err(|e| format!("Invalid `{scalar}`: {e}"))
    }

    /// Parses a string literal of the scalar.
    ///
    /// # Errors
    ///
    /// If the `token` is not a string literal.
    pub fn parse_token<S: ScalarValue>(
        token: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(token)
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue, Value};
    use service::domain;

    use crate::api::instructor::Category;

    use super::Via;

    type ViaCategory = Via<domain::instructor::Category>;

    #[test]
    fn renders_display_form() {
        let category = Category::from(
            "AB".parse::<domain::instructor::Category>().unwrap(),
        );

        assert_eq!(
            ViaCategory::to_output::<_, DefaultScalarValue>(&category),
            Value::scalar("AB".to_owned()),
        );
    }

    #[test]
    fn rejects_non_string_and_invalid_input() {
        let number = InputValue::<DefaultScalarValue>::scalar(1);
        let err = ViaCategory::from_input::<Category, _>(&number).unwrap_err();
        assert!(err.contains("LicenseCategory"), "{err}");

        let unknown = InputValue::<DefaultScalarValue>::scalar("Z".to_owned());
        assert!(ViaCategory::from_input::<Category, _>(&unknown).is_err());
    }
}
