//! Diesel schema. Regenerate with `diesel print-schema`.

diesel::table! {
    kv_store (key) {
        key -> Text,
        value -> Jsonb,
        updated_at -> Timestamptz,
    }
}
