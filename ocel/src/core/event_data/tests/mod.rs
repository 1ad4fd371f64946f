mod ocel_fixture_tests;
