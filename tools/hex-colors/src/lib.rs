//! Provides the `color_from_hex!` macro for converting RGB and RGBA hex colors
//! to a byte array at compile time.
//!
//! Accepts either an integral literal with a `0x` prefix or a CSS-like string
//! literal with an optional `#`.
//!
//! # Examples
//! ```
//! # use hex_colors::color_from_hex;
//!
//! // The macro can be used in const context
//! const SIENNA: [u8; 3] = color_from_hex!(0xa0522d);
//! # fn main() {
//! assert_eq!(SIENNA, [0xA0, 0x52, 0x2D]);
//!
//! assert_eq!(color_from_hex!("#4285F4"), [0x42, 0x85, 0xF4]);
//! assert_eq!(color_from_hex!("ff000080"), [0xFF, 0x00, 0x00, 0x80]);
//! assert_eq!(color_from_hex!(0x0a0B0C), [10, 11, 12]);
//! # }
//! ```

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, Lit,
};

struct HexColor {
    bytes: Vec<u8>,
}

fn digits_of(lit: &Lit) -> Option<String> {
    match lit {
        Lit::Int(int) => {
            let token = int.token().to_string();
            token.strip_prefix("0x").map(|digits| digits.replace('_', ""))
        }
        Lit::Str(str) => {
            let value = str.value();
            Some(value.strip_prefix('#').unwrap_or(&value).to_owned())
        }
        _ => None,
    }
}

impl Parse for HexColor {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let lit = input.parse::<Lit>()?;

        if let Lit::Int(int) = &lit {
            if !int.suffix().is_empty() {
                return Err(input.error("integral literal cannot contain a type suffix"));
            }
        }

        let digits = digits_of(&lit)
            .ok_or_else(|| input.error("expected `0x` integral literal or hex string"))?;

        if !digits.is_ascii() || !matches!(digits.len(), 6 | 8) {
            return Err(input.error("expected 6 or 8 hex digits, ex: 4c4c4cff"));
        }

        let bytes = (0..digits.len())
            .step_by(2)
            .map(|at| u8::from_str_radix(&digits[at..at + 2], 16))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| input.error("invalid hex digit"))?;

        Ok(Self { bytes })
    }
}

/// Converts a hex color literal into `[u8; 3]` (RGB) or `[u8; 4]` (RGBA).
#[proc_macro]
pub fn color_from_hex(input: TokenStream) -> TokenStream {
    let HexColor { bytes } = parse_macro_input!(input as HexColor);

    quote!([#(#bytes),*]).into()
}
