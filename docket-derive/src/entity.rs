use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{
    DataStruct, DeriveInput, Expr, ExprLit, Field, Fields, GenericArgument, Lit, LitStr, Meta,
    PathArguments, Result, Token, Type,
};

pub(crate) fn generate_entity_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let fields = match &data.fields {
        Fields::Named(fields) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "only structs with named fields are supported",
            ))
        }
    };

    let mut entity_name = name.to_string();
    let mut id_field_name: Option<String> = None;
    let mut native = false;
    let mut id_found = false;

    for attr in &ast.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    entity_name = s.value();
                    Ok(())
                } else if meta.path.is_ident("id") {
                    if id_found {
                        return Err(meta.error("Multiple id attributes are not allowed"));
                    }
                    id_found = true;

                    meta.parse_nested_meta(|meta| {
                        if meta.path.is_ident("field") {
                            let value = meta.value()?;
                            let s: LitStr = value.parse()?;
                            id_field_name = Some(s.value());
                            Ok(())
                        } else if meta.path.is_ident("native") {
                            native = true;
                            Ok(())
                        } else {
                            Err(meta.error("Unknown id attribute, expected `field` or `native`"))
                        }
                    })
                } else {
                    Err(meta.error("Unknown entity attribute, expected `name` or `id`"))
                }
            })?
        }
    }

    if entity_name.trim().is_empty() {
        return Err(syn::Error::new_spanned(ast, "entity name cannot be empty"));
    }

    let id_field = find_id_field(ast, fields.iter(), id_field_name.as_deref())?;
    let document_field = document_field_name(id_field)?;
    let key_type = unwrap_option(&id_field.ty);

    let id_type_code: proc_macro2::TokenStream = if native {
        quote! {
            type Id = docket::repository::NativeObjectId;
        }
    } else {
        quote! {
            type Id = docket::repository::OpaqueKey<#key_type>;
        }
    };

    // native keys are strings; anything else fails to type-check against KeyOf
    let native_check: proc_macro2::TokenStream = if native {
        quote! {
            const _: fn() = || {
                fn key_is_string(_: ::std::marker::PhantomData<::std::string::String>) {}
                key_is_string(::std::marker::PhantomData::<#key_type>);
            };
        }
    } else {
        quote! {}
    };

    let gen = quote! {
        impl #impl_generics docket::repository::Entity for #name #ty_generics #where_clause {
            #id_type_code

            fn entity_name() -> String {
                #entity_name.to_string()
            }

            fn entity_id() -> docket::repository::EntityId {
                docket::repository::EntityId::new(#document_field)
            }
        }

        #native_check
    };

    Ok(gen.into())
}

fn find_id_field<'a>(
    ast: &DeriveInput,
    mut fields: impl Iterator<Item = &'a Field> + Clone,
    id_field_name: Option<&str>,
) -> Result<&'a Field> {
    let named = |field: &Field, wanted: &str| {
        field
            .ident
            .as_ref()
            .is_some_and(|ident| ident == wanted)
    };

    match id_field_name {
        Some(wanted) => fields.find(|field| named(field, wanted)).ok_or_else(|| {
            syn::Error::new_spanned(ast, format!("Field {} not found in struct", wanted))
        }),
        None => fields
            .clone()
            .find(|field| named(field, "id"))
            .or_else(|| fields.find(|field| named(field, "_id")))
            .ok_or_else(|| {
                syn::Error::new_spanned(
                    ast,
                    "no id field found, name one with #[entity(id(field = \"...\"))]",
                )
            }),
    }
}

/// The document field a struct field serializes to, honouring
/// `#[serde(rename = "...")]`.
fn document_field_name(field: &Field) -> Result<String> {
    let mut renamed: Option<String> = None;

    for attr in &field.attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        let items = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        for item in items {
            if let Meta::NameValue(pair) = item {
                if pair.path.is_ident("rename") {
                    if let Expr::Lit(ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &pair.value
                    {
                        renamed = Some(s.value());
                    }
                }
            }
        }
    }

    match (renamed, &field.ident) {
        (Some(renamed), _) => Ok(renamed),
        (None, Some(ident)) => Ok(ident.to_string().trim_start_matches("r#").to_string()),
        (None, None) => Err(syn::Error::new_spanned(field, "id field must be named")),
    }
}

/// `Option<X>` becomes `X`; any other type is returned unchanged.
fn unwrap_option(ty: &Type) -> &Type {
    if let Type::Path(path) = ty {
        if path.qself.is_none() {
            if let Some(segment) = path.path.segments.last() {
                if segment.ident == "Option" {
                    if let PathArguments::AngleBracketed(args) = &segment.arguments {
                        if let Some(GenericArgument::Type(inner)) = args.args.first() {
                            return inner;
                        }
                    }
                }
            }
        }
    }
    ty
}
