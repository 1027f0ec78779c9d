mod snapshot_test;

use rstest::*;
use sak_testutils::*;
use tracing_test::traced_test;

use super::*;
use crate::prelude::*;
