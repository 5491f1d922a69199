use proptest::prelude::*;
use std::collections::HashSet;
use vmf_core::{CreationRequest, Provider, ProvisioningError};
use vmf_test_utils::{params_for, setup_service};

fn provider() -> impl Strategy<Value = Provider> {
    prop_oneof![
        Just(Provider::Aws),
        Just(Provider::Azure),
        Just(Provider::Gcp),
        Just(Provider::OnPremise),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn prop_mismatched_shape_never_builds_or_writes(tag in provider(), shape in provider()) {
        prop_assume!(tag != shape);
        let ctx = setup_service();
        let request = CreationRequest::new("mixed", params_for(shape)).with_provider(tag);

        let result = runtime().block_on(ctx.service.create_vm(request));

        prop_assert!(matches!(result, Err(ProvisioningError::Validation(_))));
        prop_assert_eq!(ctx.builds(), 0);
        prop_assert_eq!(ctx.repository.writes(), 0);
        prop_assert_eq!(ctx.audit.len(), 1);
    }

    #[test]
    fn prop_mismatched_raw_shape_never_builds_or_writes(tag in provider(), shape in provider()) {
        prop_assume!(tag != shape);
        let ctx = setup_service();
        let raw = vmf_test_utils::raw_request(tag.as_str(), "mixed", &params_for(shape), None);

        let result = runtime().block_on(ctx.service.create_from_json(&raw));

        prop_assert!(matches!(result, Err(ProvisioningError::Validation(_))));
        prop_assert_eq!(ctx.builds(), 0);
        prop_assert_eq!(ctx.repository.writes(), 0);
    }

    #[test]
    fn prop_created_ids_are_distinct(providers in prop::collection::vec(provider(), 1..40)) {
        let ctx = setup_service();
        let rt = runtime();

        let mut seen = HashSet::new();
        for provider in &providers {
            let vm = rt
                .block_on(ctx.service.create_vm(CreationRequest::new("bulk", params_for(*provider))))
                .unwrap();
            prop_assert!(seen.insert(vm.id));
        }
        prop_assert_eq!(seen.len(), providers.len());
    }
}
