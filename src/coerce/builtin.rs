//! Conversions for standard library and `url` types.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

use super::shape::{Coercible, TryFactory, TypeShape};
use crate::error::FactoryError;

fn try_from_str<T: FromStr>(input: &str) -> Option<T> {
    input.trim().parse().ok()
}

// Accepts any casing, like most HTTP-facing boolean parsers.
fn try_parse_bool(input: &str) -> Option<bool> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("true") {
        Some(true)
    } else if input.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl Coercible for String {
    fn shape() -> TypeShape<Self> {
        TypeShape::text(|input| input.to_owned())
    }
}

impl Coercible for bool {
    fn shape() -> TypeShape<Self> {
        TypeShape::new().try_factory(TryFactory::TryParse, try_parse_bool)
    }
}

impl Coercible for Url {
    fn shape() -> TypeShape<Self> {
        TypeShape::uri(|input| Url::parse(input).map_err(FactoryError::from_display))
    }
}

impl Coercible for PathBuf {
    fn shape() -> TypeShape<Self> {
        TypeShape::new().constructor(PathBuf::from)
    }
}

macro_rules! coercible_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Coercible for $ty {
                fn shape() -> TypeShape<Self> {
                    TypeShape::new().try_factory(TryFactory::TryParse, try_from_str::<$ty>)
                }
            }
        )*
    };
}

coercible_from_str!(
    char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr,
);
