//! Derive macros for configuration structs documented with `(Default: ...)` annotations.
use quote::quote;
use syn::{parse_quote, Attribute, Expr, Lit, LitStr, Meta, MetaNameValue};
use synstructure::decl_derive;

/// Doc comment lines of a field.
fn doc_lines(attrs: &[Attribute]) -> Vec<LitStr> {
    let mut lines = vec![];
    for attr in attrs.iter() {
        if let Ok(Meta::NameValue(MetaNameValue {
            ident,
            lit: Lit::Str(doc_str),
            ..
        })) = attr.parse_meta()
        {
            if ident == "doc" {
                lines.push(doc_str);
            }
        }
    }
    lines
}

/// Derives a default instance from the documentation.
fn derive_doc_default(s: synstructure::Structure) -> proc_macro2::TokenStream {
    let variant = match s.variants() {
        [variant] => variant,
        _ => panic!("DocDefault requires a struct"),
    };

    let default_re = regex::Regex::new(r"\(Default: (.*)\)").unwrap();

    let body = variant.construct(|field, _| {
        let mut default_value: Expr = parse_quote!(Default::default());
        for doc_str in doc_lines(&field.attrs) {
            if let Some(default_str) = default_re.captures(&doc_str.value()) {
                let default_str = default_str.get(1).unwrap().as_str();
                let default_str = LitStr::new(default_str, doc_str.span());
                default_value = default_str
                    .parse()
                    .expect("error parsing default expression");
            }
        }
        default_value
    });

    s.gen_impl(quote! {
        gen impl Default for @Self {
            fn default() -> Self {
                #body
            }
        }
    })
}

/// Derives a `help` function listing all fields with their type and documentation.
fn derive_doc_help(s: synstructure::Structure) -> proc_macro2::TokenStream {
    let variant = match s.variants() {
        [variant] => variant,
        _ => panic!("DocHelp requires a struct"),
    };

    let mut help = String::new();

    for binding in variant.bindings() {
        let field = binding.ast();
        let name = match &field.ident {
            Some(name) => name,
            None => panic!("DocHelp requires named fields"),
        };
        let ty = &field.ty;
        let ty = quote!(#ty).to_string().replace(' ', "");

        help.push_str(&format!("{} = <{}>\n", name, ty));
        for doc_str in doc_lines(&field.attrs) {
            let line = doc_str.value();
            let line = line.trim();
            if !line.is_empty() {
                help.push_str("    ");
                help.push_str(line);
                help.push('\n');
            }
        }
    }

    let name = &s.ast().ident;

    quote! {
        impl #name {
            /// All options with their type, description and default value.
            pub fn help() -> &'static str {
                #help
            }
        }
    }
}

decl_derive!([DocDefault] => derive_doc_default);
decl_derive!([DocHelp] => derive_doc_help);
