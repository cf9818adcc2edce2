//! End-to-end scenarios for mfstage, run against a local node.
