//! Derive macros for courier-rs. Use `#[derive(Command)]` so you don't need `impl Command for T`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

fn snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Implements the `Command` trait. Name is derived from the type (e.g. `CreateOrderDelivery` → `create_order_delivery`).
/// Requires `Command` to be in scope (e.g. `use courier_rs::Command`).
#[proc_macro_derive(Command)]
pub fn derive_command(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let command_name = snake_case(&name.to_string());
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let expanded = quote! {
        impl #impl_generics Command for #name #ty_generics #where_clause {
            fn name() -> &'static str {
                #command_name
            }
        }
    };
    TokenStream::from(expanded)
}
